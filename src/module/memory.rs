//! In-memory module backend
//!
//! A complete `ModuleStore`/`ModuleDriver` implementation over in-memory
//! verse data. Used by the test suite and benches, and useful to embedders
//! that want a fixture store without a real module library on disk. The
//! driver reproduces the positional quirks of the external engine: the
//! cursor clamps at the last entry, and absent positions yield empty text
//! rather than an error.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{EngineError, Result};
use crate::reference::Reference;

use super::traits::{
    CancelToken, DictionaryDriver, ModuleDriver, ModuleFeature, ModuleStore, NativeQuery,
    NativeSearchKind, ProgressFn,
};

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid pattern"));
static LEMMA_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"lemma="([^"]*)""#).expect("valid pattern"));

#[derive(Debug, Clone)]
struct VerseEntry {
    reference: Reference,
    raw: String,
}

#[derive(Debug)]
struct ModuleData {
    name: String,
    features: HashSet<ModuleFeature>,
    /// All verse entries in canonical document order
    entries: Vec<VerseEntry>,
    /// Introduction entries keyed by (book, chapter); chapter 0 is the
    /// book-level introduction
    intros: HashMap<(String, u32), String>,
    books: Vec<String>,
}

/// An in-memory module; cheap to clone, shared behind an `Arc`
#[derive(Debug, Clone)]
pub struct MemoryModule {
    data: Arc<ModuleData>,
}

impl MemoryModule {
    pub fn builder(name: impl Into<String>) -> MemoryModuleBuilder {
        MemoryModuleBuilder {
            name: name.into(),
            features: HashSet::new(),
            entries: Vec::new(),
            intros: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// Open a driver with its own cursor over this module's data
    pub fn into_driver(self) -> Box<dyn ModuleDriver> {
        let position = initial_position(&self.data);
        Box::new(MemoryDriver {
            data: self.data,
            position,
        })
    }
}

/// Builder for in-memory modules
pub struct MemoryModuleBuilder {
    name: String,
    features: HashSet<ModuleFeature>,
    entries: Vec<VerseEntry>,
    intros: HashMap<(String, u32), String>,
}

impl MemoryModuleBuilder {
    pub fn verse(mut self, book: &str, chapter: u32, verse: u32, raw: &str) -> Self {
        self.entries.push(VerseEntry {
            reference: Reference::new(book, chapter, verse),
            raw: raw.to_string(),
        });
        self
    }

    /// Chapter introduction content (the verse-0 pseudo entry)
    pub fn chapter_intro(mut self, book: &str, chapter: u32, raw: &str) -> Self {
        self.intros
            .insert((book.to_string(), chapter), raw.to_string());
        self
    }

    /// Book-level introduction content (chapter 0, verse 0)
    pub fn book_intro(mut self, book: &str, raw: &str) -> Self {
        self.intros.insert((book.to_string(), 0), raw.to_string());
        self
    }

    pub fn feature(mut self, feature: ModuleFeature) -> Self {
        self.features.insert(feature);
        self
    }

    pub fn build(mut self) -> MemoryModule {
        self.entries.sort_by(|a, b| a.reference.cmp(&b.reference));

        let mut books = Vec::new();
        for entry in &self.entries {
            if books.last() != Some(&entry.reference.book) {
                books.push(entry.reference.book.clone());
            }
        }

        MemoryModule {
            data: Arc::new(ModuleData {
                name: self.name,
                features: self.features,
                entries: self.entries,
                intros: self.intros,
                books,
            }),
        }
    }
}

/// An in-memory dictionary module: entry strings keyed by dictionary keys
#[derive(Debug, Clone)]
pub struct MemoryDictionary {
    data: Arc<DictionaryData>,
}

#[derive(Debug)]
struct DictionaryData {
    name: String,
    version: String,
    entries: HashMap<String, String>,
}

impl MemoryDictionary {
    pub fn builder(name: impl Into<String>, version: impl Into<String>) -> MemoryDictionaryBuilder {
        MemoryDictionaryBuilder {
            name: name.into(),
            version: version.into(),
            entries: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn into_driver(self) -> Box<dyn DictionaryDriver> {
        Box::new(MemoryDictionaryDriver { data: self.data })
    }
}

/// Builder for in-memory dictionary modules
pub struct MemoryDictionaryBuilder {
    name: String,
    version: String,
    entries: HashMap<String, String>,
}

impl MemoryDictionaryBuilder {
    pub fn entry(mut self, key: &str, raw: &str) -> Self {
        self.entries.insert(key.to_string(), raw.to_string());
        self
    }

    pub fn build(self) -> MemoryDictionary {
        MemoryDictionary {
            data: Arc::new(DictionaryData {
                name: self.name,
                version: self.version,
                entries: self.entries,
            }),
        }
    }
}

struct MemoryDictionaryDriver {
    data: Arc<DictionaryData>,
}

impl DictionaryDriver for MemoryDictionaryDriver {
    fn name(&self) -> &str {
        &self.data.name
    }

    fn version(&self) -> String {
        self.data.version.clone()
    }

    fn raw_entry(&mut self, key: &str) -> String {
        self.data.entries.get(key).cloned().unwrap_or_default()
    }
}

/// In-memory module store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    modules: HashMap<String, MemoryModule>,
    dictionaries: HashMap<String, MemoryDictionary>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, module: MemoryModule) -> Self {
        self.modules.insert(module.name().to_string(), module);
        self
    }

    pub fn with_dictionary(mut self, dictionary: MemoryDictionary) -> Self {
        self.dictionaries
            .insert(dictionary.name().to_string(), dictionary);
        self
    }
}

#[async_trait]
impl ModuleStore for MemoryStore {
    async fn open(&self, module_name: &str) -> Result<Box<dyn ModuleDriver>> {
        self.modules
            .get(module_name)
            .cloned()
            .map(MemoryModule::into_driver)
            .ok_or_else(|| EngineError::ModuleNotFound(module_name.to_string()))
    }

    async fn open_dictionary(&self, module_name: &str) -> Result<Box<dyn DictionaryDriver>> {
        self.dictionaries
            .get(module_name)
            .cloned()
            .map(MemoryDictionary::into_driver)
            .ok_or_else(|| EngineError::ModuleNotFound(module_name.to_string()))
    }

    async fn module_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.modules.keys().cloned().collect();
        names.sort();
        names
    }
}

#[derive(Debug, Clone)]
enum Position {
    /// On a verse entry
    Entry(usize),
    /// On an introduction pseudo-verse; `resume` is the entry index the
    /// cursor lands on when advanced
    Intro { reference: Reference, resume: usize },
    /// A position the module has no content for
    Missing(Reference),
}

fn initial_position(data: &ModuleData) -> Position {
    if data.entries.is_empty() {
        Position::Missing(Reference::new("Gen", 1, 1))
    } else {
        Position::Entry(0)
    }
}

struct MemoryDriver {
    data: Arc<ModuleData>,
    position: Position,
}

impl MemoryDriver {
    fn last_index(&self) -> usize {
        self.data.entries.len().saturating_sub(1)
    }

    /// Index of the first entry at or after `reference`
    fn lower_bound(&self, reference: &Reference) -> usize {
        self.data
            .entries
            .partition_point(|entry| entry.reference < *reference)
    }

    fn stripped(&self, raw: &str) -> String {
        strip_markup(raw)
    }

    fn entry_matches(&self, index: usize, query: &NativeQuery) -> bool {
        let entry = &self.data.entries[index];
        match query.kind {
            NativeSearchKind::Phrase => {
                let mut haystack = self.stripped(&entry.raw);
                if query.extended_boundaries {
                    // Allow the phrase to run over into the following verse.
                    if let Some(next) = self.data.entries.get(index + 1) {
                        haystack.push(' ');
                        haystack.push_str(&self.stripped(&next.raw));
                    }
                }
                contains(&haystack, &query.term, query.case_sensitive)
            }
            NativeSearchKind::MultiWord => {
                let haystack = self.stripped(&entry.raw);
                query
                    .term
                    .split_whitespace()
                    .all(|word| contains(&haystack, word, query.case_sensitive))
            }
            NativeSearchKind::LexiconKey => LEMMA_ATTR
                .captures_iter(&entry.raw)
                .flat_map(|captures| {
                    captures
                        .get(1)
                        .map(|value| value.as_str().to_string())
                        .into_iter()
                })
                .flat_map(|value| {
                    value
                        .split_whitespace()
                        .map(|token| token.trim_start_matches("strong:").to_string())
                        .collect::<Vec<_>>()
                })
                .any(|key| {
                    if query.whole_entry {
                        key == query.term
                    } else {
                        key.starts_with(&query.term)
                    }
                }),
        }
    }
}

impl ModuleDriver for MemoryDriver {
    fn name(&self) -> &str {
        &self.data.name
    }

    fn has_feature(&self, feature: ModuleFeature) -> bool {
        self.data.features.contains(&feature)
    }

    fn book_list(&self) -> Vec<String> {
        self.data.books.clone()
    }

    fn set_position(&mut self, reference: &Reference) {
        if reference.verse == 0 {
            let resume = self.lower_bound(&Reference::new(
                reference.book.clone(),
                reference.chapter.max(1),
                1,
            ));
            self.position = Position::Intro {
                reference: reference.clone(),
                resume: resume.min(self.last_index()),
            };
            return;
        }

        let index = self.lower_bound(reference);
        match self.data.entries.get(index) {
            Some(entry) if entry.reference.book == reference.book => {
                self.position = Position::Entry(index);
            }
            _ => {
                if self.data.books.contains(&reference.book) {
                    // Past the end of a book the module does contain: clamp
                    // to the book's last entry, like the external engine's
                    // key normalization.
                    self.position = Position::Entry(index.saturating_sub(1));
                } else {
                    self.position = Position::Missing(reference.clone());
                }
            }
        }
    }

    fn advance(&mut self) {
        match &self.position {
            Position::Entry(index) => {
                self.position = Position::Entry((*index + 1).min(self.last_index()));
            }
            Position::Intro { reference, resume } => {
                self.position = if self.data.entries.is_empty() {
                    Position::Missing(reference.clone())
                } else {
                    Position::Entry(*resume)
                };
            }
            // No content to advance over; the repeated key ends any walk.
            Position::Missing(_) => {}
        }
    }

    fn current_reference(&self) -> Reference {
        match &self.position {
            Position::Entry(index) => self.data.entries[*index].reference.clone(),
            Position::Intro { reference, .. } => reference.clone(),
            Position::Missing(reference) => reference.clone(),
        }
    }

    fn current_raw_entry(&self) -> String {
        match &self.position {
            Position::Entry(index) => self.data.entries[*index].raw.clone(),
            Position::Intro { reference, .. } => self
                .data
                .intros
                .get(&(reference.book.clone(), reference.chapter))
                .cloned()
                .unwrap_or_default(),
            Position::Missing(_) => String::new(),
        }
    }

    fn current_stripped_entry(&self) -> String {
        strip_markup(&self.current_raw_entry())
    }

    fn search(
        &mut self,
        query: &NativeQuery,
        cancel: &CancelToken,
        progress: Option<&ProgressFn>,
    ) -> Vec<Reference> {
        let scope: Option<HashSet<&str>> = query
            .scope
            .as_ref()
            .map(|books| books.iter().map(String::as_str).collect());

        let total = self.data.entries.len();
        let mut results = Vec::new();

        for index in 0..total {
            if cancel.is_cancelled() {
                return Vec::new();
            }
            if let Some(report) = progress {
                report((index * 100 / total.max(1)) as u8);
            }

            let book = self.data.entries[index].reference.book.as_str();
            if let Some(scope) = &scope {
                if !scope.contains(book) {
                    continue;
                }
            }

            if self.entry_matches(index, query) {
                results.push(self.data.entries[index].reference.clone());
            }
        }

        if let Some(report) = progress {
            report(100);
        }
        results
    }
}

fn contains(haystack: &str, needle: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        haystack.contains(needle)
    } else {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }
}

/// Plain-text rendition of a raw entry: tags removed, basic entities
/// decoded, whitespace collapsed
pub fn strip_markup(raw: &str) -> String {
    let text = TAG.replace_all(raw, " ");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&amp;", "&");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
