//! Canonical-text module engine
//!
//! Retrieval, search and markup normalization over installed text modules
//! (bible translations, commentaries, dictionaries). The backend is
//! abstracted behind the [`module::traits::ModuleStore`] seam; an in-memory
//! implementation ships for tests and embedders without an on-disk library.
//!
//! # Modules
//!
//! - `reference`: book/chapter/verse addresses, parsing and range expansion
//! - `module`: backend traits, cursor adapter, numbering, quirk profiles
//! - `markup`: normalization of raw module markup into one HTML dialect
//! - `text`: the walking retrieval core
//! - `search`: scope resolution, lexicon keys, word-boundary filtering
//! - `lexicon`: Strong's dictionary-entry lookup and parsing
//! - `engine`: the embedder-facing facade

pub mod engine;
pub mod error;
pub mod lexicon;
pub mod markup;
pub mod module;
pub mod reference;
pub mod search;
pub mod text;

pub use engine::TextEngine;
pub use error::{EngineError, Result};
pub use lexicon::{StrongsEntry, StrongsReference};
pub use reference::Reference;
pub use search::{SearchKind, SearchScope, SearchSpec};
pub use text::{TextOptions, TextQuery, VerseRecord};
