//! Module backend traits
//!
//! Backend-agnostic interfaces for the external module engine. The engine
//! core only ever talks to a module through these seams: a store that opens
//! named modules, and a driver exposing a mutable position cursor, raw and
//! stripped entry text, feature flags and the native search primitive.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::reference::Reference;

/// Per-module boolean capabilities derived from module configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleFeature {
    /// Words carry lexicon-key (lemma) tagging
    LexiconKeyTagging,
    /// Module links words to a Hebrew lexicon
    HebrewLexicon,
    /// Module links words to a Greek lexicon
    GreekLexicon,
    /// Module carries section headings
    Headings,
    /// Module carries footnotes
    Footnotes,
}

/// Candidate-search kind understood by the native search primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeSearchKind {
    /// Exact substring of the rendered verse text
    Phrase,
    /// Every word must occur somewhere in the verse
    MultiWord,
    /// Match against lemma-tag attribute entries
    LexiconKey,
}

/// Query handed to the native search primitive
#[derive(Debug, Clone)]
pub struct NativeQuery {
    pub term: String,
    pub kind: NativeSearchKind,
    pub case_sensitive: bool,
    /// Allow matches to extend past strict per-verse boundaries
    pub extended_boundaries: bool,
    /// Match the whole attribute entry, not a prefix (lexicon-key searches)
    pub whole_entry: bool,
    /// Restriction to a list of book codes; `None` searches the whole corpus
    pub scope: Option<Vec<String>>,
}

/// Cooperative cancellation flag shared between a caller and a running search
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Progress callback invoked with a 0..=100 percentage
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// An opened module with a mutable position cursor.
///
/// The cursor is module-global state: a driver must be exclusively owned by
/// the operation walking it. Positioning past the end of the module leaves
/// the cursor on its last entry, so a repeated reference signals the end of
/// addressable content.
pub trait ModuleDriver: Send {
    /// Module name as registered in the store
    fn name(&self) -> &str;

    fn has_feature(&self, feature: ModuleFeature) -> bool;

    /// Book codes the module claims to contain, in document order
    fn book_list(&self) -> Vec<String>;

    /// Position the cursor. Verse 0 addresses the chapter introduction
    /// pseudo-verse; chapter 0 / verse 0 the book introduction.
    fn set_position(&mut self, reference: &Reference);

    /// Move to the next canonical verse; keeps the last position at the end
    fn advance(&mut self);

    fn current_reference(&self) -> Reference;

    /// Raw, unprocessed markup at the current position
    fn current_raw_entry(&self) -> String;

    /// Plain text at the current position, markup stripped.
    ///
    /// An empty result is the only way the engine signals that a position
    /// has no content; there is no explicit existence API.
    fn current_stripped_entry(&self) -> String;

    /// Native candidate search. Returns matching references in document
    /// order; checks `cancel` between candidates and returns early when set.
    fn search(
        &mut self,
        query: &NativeQuery,
        cancel: &CancelToken,
        progress: Option<&ProgressFn>,
    ) -> Vec<Reference>;
}

/// An opened dictionary module, keyed by entry strings instead of verse
/// references. Lexicon entries (Strong's numbers) are looked up here.
pub trait DictionaryDriver: Send {
    /// Module name as registered in the store
    fn name(&self) -> &str;

    /// The module's config version string; the leading digit selects the
    /// raw-entry format generation
    fn version(&self) -> String;

    /// Raw entry under a dictionary key; empty when the key has no content
    fn raw_entry(&mut self, key: &str) -> String;
}

/// Access to the installed module library
#[async_trait]
pub trait ModuleStore: Send + Sync {
    /// Open a named module, yielding an exclusively owned driver
    async fn open(&self, module_name: &str) -> Result<Box<dyn ModuleDriver>>;

    /// Open a named dictionary module
    async fn open_dictionary(&self, module_name: &str) -> Result<Box<dyn DictionaryDriver>>;

    /// Names of all installed modules
    async fn module_names(&self) -> Vec<String>;
}

/// Whether a module links words to a Hebrew or Greek lexicon
pub fn module_has_lexicon_keys(driver: &dyn ModuleDriver) -> bool {
    driver.has_feature(ModuleFeature::HebrewLexicon)
        || driver.has_feature(ModuleFeature::GreekLexicon)
}
