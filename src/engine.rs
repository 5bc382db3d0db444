//! Engine facade
//!
//! `TextEngine` is the embedder-facing entry point: it owns the module
//! store and the quirk table, opens a fresh driver per call (the driver's
//! position cursor is module-global state, so drivers are never shared),
//! and serializes searches so the per-module cancel flags stay meaningful.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::lexicon::{self, StrongsEntry};
use crate::module::numbering::chapter_verse_counts;
use crate::module::quirks::QuirkTable;
use crate::module::traits::{self, CancelToken, ModuleStore, ProgressFn};
use crate::reference::{self, Reference};
use crate::search::{run_search, SearchSpec};
use crate::text::{self, TextOptions, TextQuery, VerseRecord};

pub struct TextEngine {
    store: Arc<dyn ModuleStore>,
    quirks: QuirkTable,
    /// One search runs at a time; retrieval is unaffected
    search_lock: tokio::sync::Mutex<()>,
    /// Cancel flags of registered searches, keyed by module name. A module
    /// can have several entries when searches are queued behind the lock.
    cancel_flags: Mutex<HashMap<String, Vec<(u64, CancelToken)>>>,
    next_search_id: AtomicU64,
}

impl TextEngine {
    /// Engine over a store, with the builtin quirk profiles
    pub fn new(store: Arc<dyn ModuleStore>) -> Self {
        Self::with_quirks(store, QuirkTable::builtin())
    }

    pub fn with_quirks(store: Arc<dyn ModuleStore>, quirks: QuirkTable) -> Self {
        Self {
            store,
            quirks,
            search_lock: tokio::sync::Mutex::new(()),
            cancel_flags: Mutex::new(HashMap::new()),
            next_search_id: AtomicU64::new(0),
        }
    }

    /// Names of all installed modules
    pub async fn module_names(&self) -> Vec<String> {
        self.store.module_names().await
    }

    /// Book codes a module contains, in document order
    pub async fn book_list(&self, module_name: &str) -> Result<Vec<String>> {
        let driver = self.store.open(module_name).await?;
        Ok(driver.book_list())
    }

    /// Per-book vector of per-chapter verse counts
    pub async fn chapter_verse_counts(
        &self,
        module_name: &str,
    ) -> Result<HashMap<String, Vec<u32>>> {
        let mut driver = self.store.open(module_name).await?;
        Ok(chapter_verse_counts(driver.as_mut()))
    }

    /// Whether a module links words to a Hebrew or Greek lexicon
    pub async fn module_has_lexicon_keys(&self, module_name: &str) -> Result<bool> {
        let driver = self.store.open(module_name).await?;
        Ok(traits::module_has_lexicon_keys(driver.as_ref()))
    }

    /// Retrieve text with default options (markup enabled)
    pub async fn get_text(
        &self,
        module_name: &str,
        query: &TextQuery,
    ) -> Result<Vec<VerseRecord>> {
        self.get_text_with_options(module_name, query, TextOptions::default())
            .await
    }

    pub async fn get_text_with_options(
        &self,
        module_name: &str,
        query: &TextQuery,
        options: TextOptions,
    ) -> Result<Vec<VerseRecord>> {
        debug!(module = module_name, ?query, "text retrieval");
        let mut driver = self.store.open(module_name).await?;
        Ok(text::retrieve(driver.as_mut(), &self.quirks, query, options))
    }

    /// Normalized book introduction; empty when the module carries none
    pub async fn get_book_introduction(
        &self,
        module_name: &str,
        book: &str,
    ) -> Result<String> {
        let mut driver = self.store.open(module_name).await?;
        Ok(text::book_introduction(driver.as_mut(), book))
    }

    /// Expand a range expression into the references it denotes
    pub fn references_from_range(&self, range: &str) -> Result<Vec<Reference>> {
        reference::parse_range(range)
    }

    /// Look up a Strong's dictionary entry; the key prefix selects the
    /// Hebrew or Greek dictionary module
    pub async fn get_strongs_entry(&self, key: &str) -> Result<StrongsEntry> {
        let dictionary = match key.as_bytes().first() {
            Some(b'H') => "StrongsHebrew",
            Some(b'G') => "StrongsGreek",
            _ => return Err(EngineError::InvalidLexiconKey(key.to_string())),
        };
        debug!(key, dictionary, "dictionary lookup");
        let mut driver = self.store.open_dictionary(dictionary).await?;
        lexicon::strongs_entry(driver.as_mut(), key)
    }

    pub async fn search(
        &self,
        module_name: &str,
        spec: &SearchSpec,
    ) -> Result<Vec<VerseRecord>> {
        self.run_search(module_name, spec, None).await
    }

    /// Search with a progress callback (0..=100 percent)
    pub async fn search_with_progress(
        &self,
        module_name: &str,
        spec: &SearchSpec,
        progress: ProgressFn,
    ) -> Result<Vec<VerseRecord>> {
        self.run_search(module_name, spec, Some(progress)).await
    }

    /// Request cancellation of every search registered against a module,
    /// running or still queued behind the search lock.
    ///
    /// A running search observes the flag between candidates and returns an
    /// empty result set; a queued one returns empty as soon as it starts.
    /// Calling this with no search in flight is a no-op.
    pub fn cancel_search(&self, module_name: &str) {
        if let Some(tokens) = self.cancel_flags.lock().get(module_name) {
            for (_, token) in tokens {
                token.cancel();
            }
        }
    }

    async fn run_search(
        &self,
        module_name: &str,
        spec: &SearchSpec,
        progress: Option<ProgressFn>,
    ) -> Result<Vec<VerseRecord>> {
        debug!(module = module_name, term = %spec.term, "search");

        // The flag is registered before the lock is taken so a caller can
        // cancel a search that is still queued. Each search keeps its own
        // entry; a queued search must not displace the running one's flag.
        let search_id = self.next_search_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancelToken::new();
        self.cancel_flags
            .lock()
            .entry(module_name.to_string())
            .or_default()
            .push((search_id, cancel.clone()));

        let _running = self.search_lock.lock().await;

        let outcome = match self.store.open(module_name).await {
            Ok(mut driver) => {
                // The native walk is synchronous; keep it off the async
                // workers while the lock is held.
                let quirks = self.quirks.clone();
                let spec = spec.clone();
                let cancel = cancel.clone();
                tokio::task::spawn_blocking(move || {
                    run_search(driver.as_mut(), &quirks, &spec, &cancel, progress.as_ref())
                })
                .await
                .map_err(|err| EngineError::Backend(err.to_string()))
                .and_then(|records| records)
            }
            Err(err) => Err(err),
        };

        let mut flags = self.cancel_flags.lock();
        if let Some(tokens) = flags.get_mut(module_name) {
            tokens.retain(|(id, _)| *id != search_id);
        }
        if flags.get(module_name).is_some_and(Vec::is_empty) {
            flags.remove(module_name);
        }
        drop(flags);

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::memory::{MemoryDictionary, MemoryModule, MemoryStore};
    use crate::search::SearchKind;

    fn engine() -> TextEngine {
        let module = MemoryModule::builder("TestBible")
            .verse("Gen", 1, 1, "In the beginning God created")
            .verse("Gen", 1, 2, "And the earth was without form")
            .verse("Matt", 1, 1, "The book of the generation")
            .build();
        let store = MemoryStore::new().with_module(module);
        TextEngine::with_quirks(Arc::new(store), QuirkTable::empty())
    }

    #[tokio::test]
    async fn test_unknown_module_is_an_error() {
        let engine = engine();
        let result = engine
            .get_text("Nope", &TextQuery::WholeCorpus)
            .await;
        assert!(matches!(result, Err(EngineError::ModuleNotFound(_))));
    }

    #[tokio::test]
    async fn test_book_list() {
        let engine = engine();
        assert_eq!(engine.book_list("TestBible").await.unwrap(), vec!["Gen", "Matt"]);
    }

    #[tokio::test]
    async fn test_get_text_and_search_share_one_store() {
        let engine = engine();

        let records = engine
            .get_text(
                "TestBible",
                &TextQuery::Chapter {
                    code: "Gen".to_string(),
                    chapter: 1,
                },
            )
            .await
            .unwrap();
        assert_eq!(records.len(), 2);

        let hits = engine
            .search("TestBible", &SearchSpec::new("beginning", SearchKind::MultiWord))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].reference, "Gen 1:1");
    }

    #[tokio::test]
    async fn test_cancel_reaches_running_search_with_second_search_queued() {
        let engine = Arc::new(engine());
        let canceller = Arc::clone(&engine);
        let progress: ProgressFn = Arc::new(move |_| {
            canceller.cancel_search("TestBible");
        });

        // The second search registers its cancel flag while the first one
        // runs; cancelling by module name must still reach both.
        let spec = SearchSpec::new("the", SearchKind::MultiWord);
        let (first, second) = tokio::join!(
            engine.search_with_progress("TestBible", &spec, progress),
            engine.search("TestBible", &spec),
        );
        assert!(first.unwrap().is_empty());
        assert!(second.unwrap().is_empty());
        assert!(engine.cancel_flags.lock().is_empty());
    }

    #[tokio::test]
    async fn test_strongs_entry_routed_by_key_prefix() {
        let dictionary = MemoryDictionary::builder("StrongsHebrew", "1.2")
            .entry(
                "430",
                "430  'elohiym  el-o-heem'\n\n gods in the ordinary sense\n see HEBREW for 0410",
            )
            .build();
        let store = MemoryStore::new().with_dictionary(dictionary);
        let engine = TextEngine::with_quirks(Arc::new(store), QuirkTable::empty());

        let entry = engine.get_strongs_entry("H430").await.unwrap();
        assert_eq!(entry.transcription, "'elohiym");
        assert_eq!(entry.references[0].key.as_deref(), Some("H410"));

        // Greek keys route to the Greek dictionary, absent here.
        assert!(matches!(
            engine.get_strongs_entry("G2316").await,
            Err(EngineError::ModuleNotFound(_))
        ));
        assert!(matches!(
            engine.get_strongs_entry("2316").await,
            Err(EngineError::InvalidLexiconKey(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_without_running_search_is_noop() {
        let engine = engine();
        engine.cancel_search("TestBible");
        let hits = engine
            .search("TestBible", &SearchSpec::new("the", SearchKind::MultiWord))
            .await
            .unwrap();
        assert!(!hits.is_empty());
    }

    #[tokio::test]
    async fn test_search_with_progress_reports_completion() {
        use std::sync::atomic::{AtomicU8, Ordering};

        let engine = engine();
        let seen = Arc::new(AtomicU8::new(0));
        let seen_in_callback = Arc::clone(&seen);
        let progress: ProgressFn = Arc::new(move |percent| {
            seen_in_callback.fetch_max(percent, Ordering::SeqCst);
        });

        engine
            .search_with_progress(
                "TestBible",
                &SearchSpec::new("the", SearchKind::MultiWord),
                progress,
            )
            .await
            .unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 100);
    }
}
