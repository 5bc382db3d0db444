//! Verse range expressions
//!
//! Grammar (simplified):
//! ```text
//! range      = segment (";" segment)*
//! segment    = reference ["-" end]
//! reference  = book chapter ":" verse
//! end        = [chapter ":"] verse
//! ```
//!
//! A hyphenated end may repeat the chapter (`Gen 1:1-1:5`) or give the verse
//! only (`Gen 1:1-5`); both expand within a single chapter. Ranges that span
//! chapters cannot be enumerated without a module's versification and are
//! rejected.

use crate::error::{EngineError, Result};

use super::parser::parse;
use super::types::Reference;

/// Expand a range expression into canonical references in document order.
///
/// The result is finite and can be re-iterated freely.
pub fn parse_range(expression: &str) -> Result<Vec<Reference>> {
    let invalid = || EngineError::InvalidRangeExpression(expression.to_string());

    if expression.trim().is_empty() {
        return Err(invalid());
    }

    let mut references = Vec::new();

    for segment in expression.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            return Err(invalid());
        }

        match segment.split_once('-') {
            None => references.push(parse(segment)?),
            Some((start, end)) => {
                let start = parse(start.trim())?;
                let end = end.trim();

                let end_verse = match end.split_once(':') {
                    // Chapter-qualified end: chapter must match the start.
                    Some((chapter, verse)) => {
                        let chapter: u32 = chapter.trim().parse().map_err(|_| invalid())?;
                        if chapter != start.chapter {
                            return Err(invalid());
                        }
                        verse.trim().parse::<u32>().map_err(|_| invalid())?
                    }
                    None => end.parse::<u32>().map_err(|_| invalid())?,
                };

                if end_verse < start.verse {
                    return Err(invalid());
                }

                for verse in start.verse..=end_verse {
                    references.push(Reference::new(start.book.clone(), start.chapter, verse));
                }
            }
        }
    }

    Ok(references)
}

/// Expand a range expression into canonical reference strings.
pub fn references_from_range(expression: &str) -> Result<Vec<String>> {
    Ok(parse_range(expression)?
        .iter()
        .map(Reference::to_string)
        .collect())
}
