//! Text retrieval engine
//!
//! One walking core serves the whole-corpus, whole-book, single-chapter and
//! bounded query modes; they differ only in their start position and stop
//! predicate. The explicit-reference-list mode repositions per reference
//! instead of walking. Output records are strictly ordered by canonical
//! reference within one call.

pub mod types;

use std::collections::BTreeSet;

use tracing::warn;

use crate::markup::{
    normalize_book_introduction, normalize_verse, rebalance_divs, NormalizeOptions,
};
use crate::module::cursor::VerseCursor;
use crate::module::numbering::absolute_verse_numbers;
use crate::module::quirks::{Quirk, QuirkTable};
use crate::module::traits::{ModuleDriver, ModuleFeature};
use crate::reference::Reference;

pub use types::{TextOptions, TextQuery, VerseRecord};

/// How far a sequential walk may run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryLimit {
    /// Stop only at the end of the module
    None,
    /// Stop when the book changes
    Book,
    /// Stop when the chapter changes
    Chapter,
}

/// Retrieve text for a query against an opened module
pub fn retrieve(
    driver: &mut dyn ModuleDriver,
    quirks: &QuirkTable,
    query: &TextQuery,
    options: TextOptions,
) -> Vec<VerseRecord> {
    match query {
        TextQuery::WholeCorpus => {
            let start = first_reference(driver);
            walk(driver, quirks, start, QueryLimit::None, None, None, options)
        }
        TextQuery::Book {
            code,
            start_verse,
            count,
        } => walk(
            driver,
            quirks,
            Reference::book_start(code.clone()),
            QueryLimit::Book,
            *start_verse,
            *count,
            options,
        ),
        TextQuery::Chapter { code, chapter } => walk(
            driver,
            quirks,
            Reference::chapter_start(code.clone(), *chapter),
            QueryLimit::Chapter,
            None,
            None,
            options,
        ),
        TextQuery::References(references) => {
            retrieve_references(driver, quirks, references, options)
        }
    }
}

/// Normalized (or stripped) content of the verse under the cursor.
///
/// Shared by retrieval and search so both assemble records the same way.
pub(crate) fn current_verse_content(
    cursor: &VerseCursor<'_>,
    markup: bool,
    lexicon_keys: bool,
    rebalance: bool,
) -> String {
    if !markup {
        return cursor.stripped_entry().trim().to_string();
    }

    let current = cursor.current();
    let options = NormalizeOptions {
        lexicon_keys,
        section_title_context: Some((current.chapter, current.verse)),
    };
    let mut content = normalize_verse(&cursor.raw_entry(), &options);
    if rebalance {
        content = rebalance_divs(&content);
    }
    content
}

fn first_reference(driver: &dyn ModuleDriver) -> Reference {
    driver
        .book_list()
        .first()
        .map(|book| Reference::book_start(book.clone()))
        .unwrap_or_else(|| Reference::book_start("Gen"))
}

#[allow(clippy::too_many_arguments)]
fn walk(
    driver: &mut dyn ModuleDriver,
    quirks: &QuirkTable,
    start: Reference,
    limit: QueryLimit,
    start_verse: Option<u32>,
    count: Option<u32>,
    options: TextOptions,
) -> Vec<VerseRecord> {
    let module_name = driver.name().to_string();
    let lexicon_keys = driver.has_feature(ModuleFeature::LexiconKeyTagging);
    let markup = options.markup && !quirks.has(&module_name, Quirk::UnreliableMarkup);
    let rebalance = quirks.has(&module_name, Quirk::UnbalancedDivClosers);

    // A single-verse page of a bounded query re-renders next to its
    // neighbors; the chapter heading would show up twice.
    let suppress_heading = start_verse.is_some() && count == Some(1);

    let numbering_books = match limit {
        QueryLimit::None => Vec::new(),
        QueryLimit::Book | QueryLimit::Chapter => vec![start.book.clone()],
    };
    let numbers = absolute_verse_numbers(driver, &numbering_books);

    let mut records = Vec::new();
    let mut cursor = VerseCursor::new(driver);
    cursor.seek(&start);
    for _ in 1..start_verse.unwrap_or(1) {
        cursor.advance();
    }

    let mut index: u32 = 0;
    let mut last_reference: Option<Reference> = None;
    let mut book_existing = true;

    loop {
        if cursor.end_reached() {
            break;
        }
        let current = cursor.current();

        if let Some(last) = &last_reference {
            match limit {
                QueryLimit::Book if !current.same_book(last) => break,
                QueryLimit::Chapter if !current.same_chapter(last) => break,
                _ => {}
            }
        }
        if matches!(count, Some(count) if index >= count) {
            break;
        }

        let first_in_book = !matches!(&last_reference, Some(last) if current.same_book(last));
        if first_in_book {
            book_existing = true;
        }

        let mut content = String::new();

        if markup && current.verse == 1 && !suppress_heading {
            let heading = cursor.intro_entry(&current.book, current.chapter);
            if !heading.is_empty() {
                let heading_options = NormalizeOptions {
                    lexicon_keys,
                    section_title_context: Some((current.chapter, current.verse)),
                };
                let mut heading = normalize_verse(&heading, &heading_options);
                if rebalance {
                    heading = rebalance_divs(&heading);
                }
                content.push_str(&heading);
            }
        }

        content.push_str(&current_verse_content(&cursor, markup, lexicon_keys, rebalance));

        // An empty first verse means the module does not carry this book;
        // suppress the empty placeholders that would otherwise follow.
        if content.is_empty() && first_in_book {
            book_existing = false;
        }

        if book_existing {
            let key = current.to_string();
            let absolute_verse_number = numbers.get(&key).copied().unwrap_or(-1);
            records.push(VerseRecord {
                reference: key,
                absolute_verse_number,
                content,
            });
        }

        last_reference = Some(current);
        cursor.advance();
        index += 1;
    }

    records
}

fn retrieve_references(
    driver: &mut dyn ModuleDriver,
    quirks: &QuirkTable,
    references: &[Reference],
    options: TextOptions,
) -> Vec<VerseRecord> {
    let module_name = driver.name().to_string();
    let lexicon_keys = driver.has_feature(ModuleFeature::LexiconKeyTagging);
    let markup = options.markup && !quirks.has(&module_name, Quirk::UnreliableMarkup);
    let rebalance = quirks.has(&module_name, Quirk::UnbalancedDivClosers);

    // Number only the books the list touches.
    let books: Vec<String> = references
        .iter()
        .map(|reference| reference.book.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let numbers = absolute_verse_numbers(driver, &books);

    let mut records = Vec::new();
    let mut cursor = VerseCursor::new(driver);

    for reference in references {
        cursor.seek(reference);
        if !cursor.has_entry() {
            continue;
        }

        let key = cursor.current_key();
        let absolute_verse_number = numbers.get(&key).copied().unwrap_or(-1);
        records.push(VerseRecord {
            reference: key,
            absolute_verse_number,
            content: current_verse_content(&cursor, markup, lexicon_keys, rebalance),
        });
    }

    records
}

/// Normalized book introduction (the chapter-0 pseudo entry), empty when
/// the module carries none
pub fn book_introduction(driver: &mut dyn ModuleDriver, book: &str) -> String {
    let mut cursor = VerseCursor::new(driver);
    cursor.seek(&Reference::new(book, 0, 0));
    let raw = cursor.raw_entry();
    let raw = raw.trim();
    if raw.is_empty() {
        warn!(book, "no introduction entry");
        return String::new();
    }
    normalize_book_introduction(raw)
}
