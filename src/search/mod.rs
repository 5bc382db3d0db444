//! Search engine
//!
//! Resolves the search scope to a book-list restriction, canonicalizes
//! lexicon keys against the target module's padding convention, delegates
//! candidate matching to the module's native search primitive, then applies
//! the word-boundary / phrase re-check the native engine cannot do itself.
//! Cancellation is cooperative and discards all accumulated results.

pub mod filter;
pub mod types;

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::Result;
use crate::module::cursor::VerseCursor;
use crate::module::numbering::absolute_verse_numbers;
use crate::module::quirks::{Quirk, QuirkTable};
use crate::module::traits::{
    module_has_lexicon_keys, CancelToken, ModuleDriver, ModuleFeature, NativeQuery,
    NativeSearchKind, ProgressFn,
};
use crate::reference::{new_testament_books, old_testament_books, Reference};
use crate::text::{current_verse_content, VerseRecord};

pub use types::{SearchKind, SearchScope, SearchSpec};

/// Execute a search spec against an opened module
pub fn run_search(
    driver: &mut dyn ModuleDriver,
    quirks: &QuirkTable,
    spec: &SearchSpec,
    cancel: &CancelToken,
    progress: Option<&ProgressFn>,
) -> Result<Vec<VerseRecord>> {
    spec.validate()?;

    let module_name = driver.name().to_string();

    let scope = match spec.scope {
        SearchScope::WholeCorpus => None,
        SearchScope::OldTestament => Some(old_testament_books()),
        SearchScope::NewTestament => Some(new_testament_books()),
    };

    let mut term = spec.term.clone();
    let mut whole_entry = false;

    if spec.kind == SearchKind::LexiconKey {
        if !module_has_lexicon_keys(driver)
            && !driver.has_feature(ModuleFeature::LexiconKeyTagging)
        {
            // Nothing to match lemma keys against.
            return Ok(Vec::new());
        }
        term = canonical_lexicon_key(driver, quirks, &module_name, &term);
        // Whole-key match: H0430 must not hit H04300.
        whole_entry = true;
    }

    let query = NativeQuery {
        term: term.clone(),
        kind: match spec.kind {
            SearchKind::Phrase => NativeSearchKind::Phrase,
            SearchKind::MultiWord => NativeSearchKind::MultiWord,
            SearchKind::LexiconKey => NativeSearchKind::LexiconKey,
        },
        case_sensitive: spec.case_sensitive,
        extended_boundaries: spec.extended_boundaries,
        whole_entry,
        scope,
    };

    let candidates = driver.search(&query, cancel, progress);
    if cancel.is_cancelled() {
        return Ok(Vec::new());
    }
    debug!(module = %module_name, term = %term, candidates = candidates.len(), "native search done");

    let mut survivors: Vec<Reference> =
        if spec.filter_on_word_boundaries && spec.kind != SearchKind::LexiconKey {
            // Re-derive plain text with markup out of the way and keep only
            // verses where every term word is a whole token.
            let words = filter::tokenize(&spec.term, spec.case_sensitive);
            let mut cursor = VerseCursor::new(driver);
            candidates
                .into_iter()
                .filter(|reference| {
                    cursor.seek(reference);
                    let mut tokens =
                        filter::tokenize(&cursor.stripped_entry(), spec.case_sensitive);
                    if spec.extended_boundaries {
                        // The native match may run into the following verse;
                        // tokenizing the candidate alone would drop exactly
                        // the cross-verse hits the extended search admits.
                        cursor.advance();
                        if !cursor.end_reached() {
                            tokens.extend(filter::tokenize(
                                &cursor.stripped_entry(),
                                spec.case_sensitive,
                            ));
                        }
                    }
                    match spec.kind {
                        SearchKind::Phrase => filter::contains_phrase(&tokens, &words).is_some(),
                        _ => filter::contains_all_words(&tokens, &words),
                    }
                })
                .collect()
        } else {
            candidates
        };

    if cancel.is_cancelled() {
        return Ok(Vec::new());
    }

    survivors.sort();

    // Number only the books the results touch.
    let books: Vec<String> = survivors
        .iter()
        .map(|reference| reference.book.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let numbers = absolute_verse_numbers(driver, &books);

    let markup = !quirks.has(&module_name, Quirk::UnreliableMarkup);
    let rebalance = quirks.has(&module_name, Quirk::UnbalancedDivClosers);
    let lexicon_keys = driver.has_feature(ModuleFeature::LexiconKeyTagging);

    let mut cursor = VerseCursor::new(driver);
    let mut records = Vec::with_capacity(survivors.len());

    for reference in survivors {
        cursor.seek(&reference);
        let key = cursor.current_key();
        let absolute_verse_number = numbers.get(&key).copied().unwrap_or(-1);
        records.push(VerseRecord {
            reference: key,
            absolute_verse_number,
            content: current_verse_content(&cursor, markup, lexicon_keys, rebalance),
        });
    }

    Ok(records)
}

/// Rewrite a Hebrew lexicon key to the padding convention the module uses.
///
/// Modules with zero-padded keys tag `H430` as `strong:H0430`; searching the
/// unpadded form would find nothing. The quirk table decides when it knows
/// the module; otherwise a known reference verse is probed for the padded
/// marker.
fn canonical_lexicon_key(
    driver: &mut dyn ModuleDriver,
    quirks: &QuirkTable,
    module_name: &str,
    term: &str,
) -> String {
    if !term.starts_with('H') {
        return term.to_string();
    }

    let padded = if quirks.has(module_name, Quirk::ZeroPaddedLexiconKeys) {
        true
    } else if quirks.has(module_name, Quirk::UnpaddedLexiconKeys) {
        false
    } else {
        module_uses_zero_padded_keys(driver)
    };

    let digits = &term[1..];
    if padded && !digits.starts_with('0') {
        format!("H0{digits}")
    } else {
        term.to_string()
    }
}

fn module_uses_zero_padded_keys(driver: &mut dyn ModuleDriver) -> bool {
    let mut cursor = VerseCursor::new(driver);
    cursor.seek(&Reference::book_start("Gen"));
    cursor.raw_entry().contains("strong:H0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::memory::MemoryModule;

    fn fixture() -> Box<dyn ModuleDriver> {
        MemoryModule::builder("StrongsModule")
            .verse(
                "Gen",
                1,
                1,
                "<w lemma=\"strong:H07225\">In the beginning</w> <w lemma=\"strong:H0430\">God</w> created",
            )
            .verse("Gen", 1, 2, "And the earth was without form")
            .verse("Gen", 1, 3, "<w lemma=\"strong:H04300\">light</w> appeared")
            .verse("Ps", 36, 5, "thy faithfulness reacheth unto the clouds")
            .verse("Matt", 1, 1, "The book of the generation")
            .verse("John", 1, 1, "In the beginning was the Word")
            .feature(ModuleFeature::LexiconKeyTagging)
            .feature(ModuleFeature::HebrewLexicon)
            .build()
            .into_driver()
    }

    fn search(spec: &SearchSpec) -> Vec<VerseRecord> {
        let mut driver = fixture();
        run_search(
            driver.as_mut(),
            &QuirkTable::empty(),
            spec,
            &CancelToken::new(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_phrase_search_results_in_canonical_order() {
        let records = search(&SearchSpec::new("In the beginning", SearchKind::Phrase));
        let refs: Vec<&str> = records.iter().map(|r| r.reference.as_str()).collect();
        assert_eq!(refs, vec!["Gen 1:1", "John 1:1"]);
        assert_eq!(records[0].absolute_verse_number, 1);
    }

    #[test]
    fn test_scope_restriction() {
        let records = search(
            &SearchSpec::new("the", SearchKind::MultiWord).with_scope(SearchScope::NewTestament),
        );
        assert!(records
            .iter()
            .all(|r| r.reference.starts_with("Matt") || r.reference.starts_with("John")));
        assert!(!records.is_empty());
    }

    #[test]
    fn test_substring_semantics_without_boundary_filter() {
        let records = search(&SearchSpec::new("faith", SearchKind::MultiWord));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reference, "Ps 36:5");
    }

    #[test]
    fn test_word_boundary_filter_drops_partial_words() {
        let records = search(
            &SearchSpec::new("faith", SearchKind::MultiWord).filter_on_word_boundaries(true),
        );
        assert!(records.is_empty());

        let records = search(
            &SearchSpec::new("faithfulness", SearchKind::MultiWord)
                .filter_on_word_boundaries(true),
        );
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_phrase_filter_is_order_sensitive() {
        let records = search(
            &SearchSpec::new("beginning the", SearchKind::Phrase).filter_on_word_boundaries(true),
        );
        assert!(records.is_empty());

        let records = search(
            &SearchSpec::new("the beginning", SearchKind::Phrase).filter_on_word_boundaries(true),
        );
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_extended_boundaries_matches_across_verses() {
        // "created" ends Gen 1:1 and "And" opens Gen 1:2.
        let strict = search(&SearchSpec::new("created And", SearchKind::Phrase));
        assert!(strict.is_empty());

        let extended = search(
            &SearchSpec::new("created And", SearchKind::Phrase).extended_boundaries(true),
        );
        assert_eq!(extended.len(), 1);
        assert_eq!(extended[0].reference, "Gen 1:1");
    }

    #[test]
    fn test_word_filter_keeps_cross_verse_hits_under_extended_boundaries() {
        let records = search(
            &SearchSpec::new("created And", SearchKind::Phrase)
                .extended_boundaries(true)
                .filter_on_word_boundaries(true),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reference, "Gen 1:1");
    }

    #[test]
    fn test_lexicon_key_padded_whole_match() {
        // The module tags zero-padded keys; H430 is canonicalized to H0430
        // and must not hit the numeric-prefix neighbor H04300.
        let records = search(&SearchSpec::new("H430", SearchKind::LexiconKey));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reference, "Gen 1:1");
    }

    #[test]
    fn test_lexicon_key_quirk_overrides_probe() {
        let quirks =
            QuirkTable::empty().with_entry("StrongsModule", &[Quirk::UnpaddedLexiconKeys]);
        let mut driver = fixture();
        let records = run_search(
            driver.as_mut(),
            &quirks,
            &SearchSpec::new("H430", SearchKind::LexiconKey),
            &CancelToken::new(),
            None,
        )
        .unwrap();
        // Unpadded convention: the term stays H430, which no lemma carries.
        assert!(records.is_empty());
    }

    #[test]
    fn test_lexicon_search_without_lexicon_module_is_empty() {
        let mut driver = MemoryModule::builder("PlainModule")
            .verse("Gen", 1, 1, "In the beginning")
            .build()
            .into_driver();
        let records = run_search(
            driver.as_mut(),
            &QuirkTable::empty(),
            &SearchSpec::new("H0430", SearchKind::LexiconKey),
            &CancelToken::new(),
            None,
        )
        .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_invalid_term_fails_before_searching() {
        let mut driver = fixture();
        let result = run_search(
            driver.as_mut(),
            &QuirkTable::empty(),
            &SearchSpec::new("", SearchKind::Phrase),
            &CancelToken::new(),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_cancelled_search_returns_empty() {
        let mut driver = fixture();
        let cancel = CancelToken::new();
        cancel.cancel();
        let records = run_search(
            driver.as_mut(),
            &QuirkTable::empty(),
            &SearchSpec::new("the", SearchKind::MultiWord),
            &cancel,
            None,
        )
        .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_case_sensitivity() {
        let records = search(&SearchSpec::new("god", SearchKind::MultiWord).case_sensitive(true));
        assert!(records.is_empty());

        let records = search(&SearchSpec::new("God", SearchKind::MultiWord).case_sensitive(true));
        assert_eq!(records.len(), 1);
    }
}
