//! Markup normalization
//!
//! Ordered substitution pipeline turning per-module markup dialects into
//! the normalized classed dialect, plus the quirk-gated div rebalancing
//! repair. Deliberately not a parser: the rule order and the literal-vs-
//! regex split encode behavior tuned against real module output.

pub mod normalizer;
pub mod rules;

pub use normalizer::{
    normalize_book_introduction, normalize_verse, rebalance_divs, NormalizeOptions,
};
