//! Absolute verse numbering
//!
//! Assigns a 1-based sequential number to every verse of the requested
//! books by walking the module once. Numbering restarts at each book
//! boundary. The mapping is recomputed per call: callers may request
//! arbitrary book subsets, so nothing is cached.

use std::collections::HashMap;

use crate::module::cursor::VerseCursor;
use crate::module::traits::ModuleDriver;
use crate::reference::Reference;

/// Map from canonical short-form reference to its sequential number within
/// its book. Walks every verse of `books` (the module's full book list when
/// empty); this is the dominant cost of a multi-verse query and is paid
/// once per call.
pub fn absolute_verse_numbers(
    driver: &mut dyn ModuleDriver,
    books: &[String],
) -> HashMap<String, i32> {
    let books: Vec<String> = if books.is_empty() {
        driver.book_list()
    } else {
        books.to_vec()
    };

    let mut numbers = HashMap::new();
    let mut cursor = VerseCursor::new(driver);

    for book in &books {
        cursor.seek(&Reference::book_start(book.clone()));
        let mut current_number = 1;

        loop {
            if cursor.end_reached() {
                break;
            }
            let current = cursor.current();
            // The module ran out of content for this book.
            if current.book != *book {
                break;
            }

            numbers.insert(current.to_string(), current_number);
            cursor.advance();
            current_number += 1;
        }
    }

    numbers
}

/// Per-book vector of per-chapter verse counts, walked the same way as
/// numbering but across the whole module.
pub fn chapter_verse_counts(driver: &mut dyn ModuleDriver) -> HashMap<String, Vec<u32>> {
    let mut counts: HashMap<String, Vec<u32>> = HashMap::new();

    let books = driver.book_list();
    let Some(first_book) = books.first() else {
        return counts;
    };

    let mut cursor = VerseCursor::new(driver);
    cursor.seek(&Reference::book_start(first_book.clone()));

    let mut last_book: Option<String> = None;
    let mut last_chapter: Option<u32> = None;
    let mut current_chapter_count = 0u32;

    loop {
        if cursor.end_reached() {
            break;
        }
        let current = cursor.current();

        if last_book.as_deref() != Some(current.book.as_str()) {
            counts.entry(current.book.clone()).or_default();
        }

        if let (Some(book), Some(chapter)) = (&last_book, last_chapter) {
            if chapter != current.chapter || *book != current.book {
                if let Some(entry) = counts.get_mut(book) {
                    entry.push(current_chapter_count);
                }
                current_chapter_count = 0;
            }
        }

        current_chapter_count += 1;

        last_book = Some(current.book.clone());
        last_chapter = Some(current.chapter);
        cursor.advance();
    }

    if let Some(book) = last_book {
        if let Some(entry) = counts.get_mut(&book) {
            entry.push(current_chapter_count);
        }
    }

    counts
}
