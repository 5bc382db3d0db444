//! Per-module quirk profiles
//!
//! Some published modules ship with known rendering or key-formatting
//! defects. The table below classifies module names into quirk tags; it is
//! pure data, so new quirky modules can be registered at construction time
//! without touching the walking or normalization logic. The table is
//! read-only once built and safe to share across threads.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// An empirically observed per-module defect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Quirk {
    /// Markup is too broken to render; always fall back to stripped text
    UnreliableMarkup,
    /// Closing `</div>` count may not match the opening count; rebalance
    UnbalancedDivClosers,
    /// Lexicon keys are zero-padded (e.g. `H0430`)
    ZeroPaddedLexiconKeys,
    /// Lexicon keys are not zero-padded (e.g. `H430`)
    UnpaddedLexiconKeys,
}

/// Module-name-keyed quirk lookup
#[derive(Debug, Clone, Default)]
pub struct QuirkTable {
    entries: HashMap<String, HashSet<Quirk>>,
}

impl QuirkTable {
    /// Empty table, no module is considered quirky
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table of known quirky published modules
    pub fn builtin() -> Self {
        Self::empty()
            .with_entry("KJV", &[Quirk::ZeroPaddedLexiconKeys])
            .with_entry("ASV", &[Quirk::UnpaddedLexiconKeys])
            .with_entry("NETtext", &[Quirk::UnbalancedDivClosers])
            .with_entry("ISV", &[Quirk::UnbalancedDivClosers])
            .with_entry("TagAngBiblia", &[Quirk::UnreliableMarkup])
            .with_entry("FreCrampon", &[Quirk::UnreliableMarkup])
    }

    /// Register quirks for a module name
    pub fn with_entry(mut self, module_name: impl Into<String>, quirks: &[Quirk]) -> Self {
        self.entries
            .entry(module_name.into())
            .or_default()
            .extend(quirks.iter().copied());
        self
    }

    pub fn has(&self, module_name: &str, quirk: Quirk) -> bool {
        self.entries
            .get(module_name)
            .is_some_and(|quirks| quirks.contains(&quirk))
    }

    pub fn quirks_of(&self, module_name: &str) -> HashSet<Quirk> {
        self.entries.get(module_name).cloned().unwrap_or_default()
    }
}
