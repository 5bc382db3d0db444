//! Search specification types

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

static LEXICON_KEY_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[GH][0-9]+$").expect("valid pattern"));

/// What kind of matching the search performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchKind {
    /// The words must appear contiguously and in order
    Phrase,
    /// Every word must appear somewhere in the verse
    MultiWord,
    /// Match a lexicon key (e.g. `H0430`) against lemma tagging
    LexiconKey,
}

/// Restriction of a search to a section of the corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchScope {
    WholeCorpus,
    OldTestament,
    NewTestament,
}

/// One search invocation; constructed per call, consumed once
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSpec {
    pub term: String,
    pub kind: SearchKind,
    pub scope: SearchScope,
    pub case_sensitive: bool,
    /// Let the native engine match across strict per-verse boundaries
    pub extended_boundaries: bool,
    /// Re-check candidates so every term word matches a whole word token
    pub filter_on_word_boundaries: bool,
}

impl SearchSpec {
    pub fn new(term: impl Into<String>, kind: SearchKind) -> Self {
        Self {
            term: term.into(),
            kind,
            scope: SearchScope::WholeCorpus,
            case_sensitive: false,
            extended_boundaries: false,
            filter_on_word_boundaries: false,
        }
    }

    pub fn with_scope(mut self, scope: SearchScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    pub fn filter_on_word_boundaries(mut self, yes: bool) -> Self {
        self.filter_on_word_boundaries = yes;
        self
    }

    pub fn extended_boundaries(mut self, yes: bool) -> Self {
        self.extended_boundaries = yes;
        self
    }

    /// Validate before any retrieval work happens
    pub fn validate(&self) -> Result<()> {
        if self.term.trim().is_empty() {
            return Err(EngineError::InvalidSearchTerm("empty term".to_string()));
        }
        if self.kind == SearchKind::LexiconKey && !LEXICON_KEY_FORMAT.is_match(&self.term) {
            return Err(EngineError::InvalidSearchTerm(format!(
                "not a lexicon key: {}",
                self.term
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_term_rejected() {
        let spec = SearchSpec::new("  ", SearchKind::Phrase);
        assert!(matches!(
            spec.validate(),
            Err(EngineError::InvalidSearchTerm(_))
        ));
    }

    #[test]
    fn test_lexicon_key_format() {
        assert!(SearchSpec::new("H0430", SearchKind::LexiconKey).validate().is_ok());
        assert!(SearchSpec::new("G2316", SearchKind::LexiconKey).validate().is_ok());
        for bad in ["h0430", "X430", "H", "H43a0", "0430"] {
            assert!(
                SearchSpec::new(bad, SearchKind::LexiconKey).validate().is_err(),
                "expected rejection for {bad:?}"
            );
        }
        // The format only binds lexicon-key searches.
        assert!(SearchSpec::new("X430", SearchKind::Phrase).validate().is_ok());
    }

    #[test]
    fn test_spec_serializes_camel_case() {
        let spec = SearchSpec::new("light", SearchKind::MultiWord)
            .with_scope(SearchScope::NewTestament)
            .filter_on_word_boundaries(true);
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["kind"], "multiWord");
        assert_eq!(json["scope"], "newTestament");
        assert_eq!(json["filterOnWordBoundaries"], true);
    }
}
