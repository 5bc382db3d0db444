//! Engine error types
//!
//! Unified error handling for retrieval, search and reference parsing.

use thiserror::Error;

/// Unified engine error type
#[derive(Debug, Error)]
pub enum EngineError {
    /// Requested module is not installed / cannot be opened
    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    /// Reference string does not split into book and chapter:verse
    #[error("Malformed reference: {0}")]
    MalformedReference(String),

    /// Range expression failed to parse or cannot be expanded
    #[error("Invalid range expression: {0}")]
    InvalidRangeExpression(String),

    /// Search term is empty or fails lexicon-key format validation
    #[error("Invalid search term: {0}")]
    InvalidSearchTerm(String),

    /// Lexicon key is outside the dictionary's key space
    #[error("Invalid lexicon key: {0}")]
    InvalidLexiconKey(String),

    /// Failure reported by the underlying module backend
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
