//! Reference types and the canonical book table

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical book codes in document order, Old Testament first.
///
/// These are the short (OSIS-style) abbreviations used in reference strings.
pub const BOOKS: [&str; 66] = [
    // Old Testament
    "Gen", "Exod", "Lev", "Num", "Deut", "Josh", "Judg", "Ruth", "1Sam", "2Sam", "1Kgs", "2Kgs",
    "1Chr", "2Chr", "Ezra", "Neh", "Esth", "Job", "Ps", "Prov", "Eccl", "Song", "Isa", "Jer",
    "Lam", "Ezek", "Dan", "Hos", "Joel", "Amos", "Obad", "Jonah", "Mic", "Nah", "Hab", "Zeph",
    "Hag", "Zech", "Mal",
    // New Testament
    "Matt", "Mark", "Luke", "John", "Acts", "Rom", "1Cor", "2Cor", "Gal", "Eph", "Phil", "Col",
    "1Thess", "2Thess", "1Tim", "2Tim", "Titus", "Phlm", "Heb", "Jas", "1Pet", "2Pet", "1John",
    "2John", "3John", "Jude", "Rev",
];

/// Number of Old Testament books; `BOOKS[..OT_BOOK_COUNT]` is the OT.
pub const OT_BOOK_COUNT: usize = 39;

/// Position of a book code in canonical document order
pub fn book_order(code: &str) -> Option<usize> {
    BOOKS.iter().position(|b| *b == code)
}

/// Old Testament book codes
pub fn old_testament_books() -> Vec<String> {
    BOOKS[..OT_BOOK_COUNT].iter().map(|b| b.to_string()).collect()
}

/// New Testament book codes
pub fn new_testament_books() -> Vec<String> {
    BOOKS[OT_BOOK_COUNT..].iter().map(|b| b.to_string()).collect()
}

/// A structured book/chapter/verse address.
///
/// Chapter and verse are 1-based; verse 0 addresses the chapter introduction
/// pseudo-verse, and chapter 0 / verse 0 the book-level introduction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// Canonical short book code, e.g. "Gen"
    pub book: String,

    /// Chapter number (1-based, 0 for book introduction)
    pub chapter: u32,

    /// Verse number (1-based, 0 for introduction pseudo-verse)
    pub verse: u32,
}

impl Reference {
    pub fn new(book: impl Into<String>, chapter: u32, verse: u32) -> Self {
        Self {
            book: book.into(),
            chapter,
            verse,
        }
    }

    /// First addressable verse of a book
    pub fn book_start(book: impl Into<String>) -> Self {
        Self::new(book, 1, 1)
    }

    /// First verse of a chapter
    pub fn chapter_start(book: impl Into<String>, chapter: u32) -> Self {
        Self::new(book, chapter, 1)
    }

    /// The introduction pseudo-verse of this reference's chapter
    pub fn chapter_intro(&self) -> Self {
        Self::new(self.book.clone(), self.chapter, 0)
    }

    /// The canonical short form, e.g. "Gen 1:1"
    pub fn short_form(&self) -> String {
        self.to_string()
    }

    pub fn same_book(&self, other: &Reference) -> bool {
        self.book == other.book
    }

    pub fn same_chapter(&self, other: &Reference) -> bool {
        self.book == other.book && self.chapter == other.chapter
    }

    /// Whether the book belongs to the Old Testament section of the canon
    pub fn is_old_testament(&self) -> bool {
        matches!(book_order(&self.book), Some(order) if order < OT_BOOK_COUNT)
    }

    fn sort_key(&self) -> (usize, &str, u32, u32) {
        // Books outside the canonical table order after it, by name.
        let order = book_order(&self.book).unwrap_or(usize::MAX);
        (order, self.book.as_str(), self.chapter, self.verse)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book, self.chapter, self.verse)
    }
}

impl PartialOrd for Reference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Reference {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_table_shape() {
        assert_eq!(BOOKS.len(), 66);
        assert_eq!(old_testament_books().len(), 39);
        assert_eq!(new_testament_books().len(), 27);
        assert_eq!(old_testament_books()[0], "Gen");
        assert_eq!(new_testament_books()[0], "Matt");
    }

    #[test]
    fn test_display_short_form() {
        let r = Reference::new("Gen", 1, 1);
        assert_eq!(r.to_string(), "Gen 1:1");
    }

    #[test]
    fn test_ordering_follows_canon() {
        let gen = Reference::new("Gen", 50, 26);
        let exod = Reference::new("Exod", 1, 1);
        let matt = Reference::new("Matt", 1, 1);
        assert!(gen < exod);
        assert!(exod < matt);
        assert!(Reference::new("Gen", 1, 2) < Reference::new("Gen", 2, 1));
    }

    #[test]
    fn test_unknown_book_orders_after_canon() {
        let rev = Reference::new("Rev", 22, 21);
        let unknown = Reference::new("AddEsth", 1, 1);
        assert!(rev < unknown);
    }

    #[test]
    fn test_prefix_comparisons() {
        let a = Reference::new("Gen", 1, 1);
        let b = Reference::new("Gen", 1, 31);
        let c = Reference::new("Gen", 2, 1);
        assert!(a.same_book(&c));
        assert!(a.same_chapter(&b));
        assert!(!a.same_chapter(&c));
    }

    #[test]
    fn test_testament_membership() {
        assert!(Reference::new("Mal", 1, 1).is_old_testament());
        assert!(!Reference::new("Matt", 1, 1).is_old_testament());
        assert!(!Reference::new("AddEsth", 1, 1).is_old_testament());
    }
}
