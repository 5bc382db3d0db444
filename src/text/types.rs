//! Retrieval types

use serde::{Deserialize, Serialize};

use crate::reference::Reference;

/// The output unit of retrieval and search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseRecord {
    /// Canonical short-form reference, e.g. "Gen 1:1"
    pub reference: String,

    /// 1-based sequential position within the numbering scope; `-1` when
    /// the verse lies outside the scope the caller asked to number
    pub absolute_verse_number: i32,

    /// Normalized markup, or plain stripped text when markup is disabled
    pub content: String,
}

/// Addressing modes for text retrieval
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextQuery {
    /// Every verse the module contains
    WholeCorpus,

    /// One book, optionally limited to `count` verses starting at
    /// `start_verse` (1-based within the book)
    Book {
        code: String,
        start_verse: Option<u32>,
        count: Option<u32>,
    },

    /// One chapter of one book
    Chapter { code: String, chapter: u32 },

    /// An arbitrary list of references, retrieved by repositioning
    References(Vec<Reference>),
}

/// Per-call retrieval options
#[derive(Debug, Clone, Copy)]
pub struct TextOptions {
    /// Run the markup normalizer; when false, plain stripped text is
    /// returned instead
    pub markup: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self { markup: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verse_record_serializes_camel_case() {
        let record = VerseRecord {
            reference: "Gen 1:1".to_string(),
            absolute_verse_number: 1,
            content: "In the beginning".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["reference"], "Gen 1:1");
        assert_eq!(json["absoluteVerseNumber"], 1);
        assert_eq!(json["content"], "In the beginning");
    }
}
