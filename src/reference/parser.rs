//! Reference string parsing
//!
//! A reference string is a book token followed by a `chapter:verse` token,
//! e.g. `"Gen 1:1"`. Parsing is strict about arity: exactly two
//! whitespace-separated tokens, the second split by a single `:`.

use crate::error::{EngineError, Result};

use super::types::Reference;

/// Parse a reference string into its structured form.
///
/// Book, chapter and verse round-trip exactly; the rendered string is the
/// canonical short form, which may differ byte-for-byte from the input
/// (extra whitespace is not preserved).
pub fn parse(reference: &str) -> Result<Reference> {
    let malformed = || EngineError::MalformedReference(reference.to_string());

    let tokens: Vec<&str> = reference.split_whitespace().collect();
    if tokens.len() != 2 {
        return Err(malformed());
    }

    let position: Vec<&str> = tokens[1].split(':').collect();
    if position.len() != 2 {
        return Err(malformed());
    }

    let chapter: u32 = position[0].parse().map_err(|_| malformed())?;
    let verse: u32 = position[1].parse().map_err(|_| malformed())?;

    Ok(Reference::new(tokens[0], chapter, verse))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let r = parse("Gen 1:1").unwrap();
        assert_eq!(r.book, "Gen");
        assert_eq!(r.chapter, 1);
        assert_eq!(r.verse, 1);
    }

    #[test]
    fn test_parse_numbered_book() {
        let r = parse("1Kgs 19:12").unwrap();
        assert_eq!(r.book, "1Kgs");
        assert_eq!(r.chapter, 19);
        assert_eq!(r.verse, 12);
    }

    #[test]
    fn test_parse_tolerates_extra_whitespace() {
        let r = parse("  Gen   1:1 ").unwrap();
        assert_eq!(r, Reference::new("Gen", 1, 1));
    }

    #[test]
    fn test_canonical_form_is_idempotent() {
        let r = parse(" Gen  1:1").unwrap();
        let canonical = r.to_string();
        assert_eq!(parse(&canonical).unwrap(), r);
        assert_eq!(parse(&canonical).unwrap().to_string(), canonical);
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "Gen", "Gen 1", "Gen 1:1:1", "Gen one:1", "Gen 1:two", "Gen 1 1"] {
            assert!(
                matches!(parse(bad), Err(EngineError::MalformedReference(_))),
                "expected failure for {bad:?}"
            );
        }
    }

    #[test]
    fn test_parse_intro_pseudo_verse() {
        let r = parse("Gen 1:0").unwrap();
        assert_eq!(r.verse, 0);
    }
}
