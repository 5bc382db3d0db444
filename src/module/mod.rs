//! Module backend seam and helpers
//!
//! - `traits`: backend-agnostic store/driver interfaces
//! - `cursor`: verse cursor adapter with end-of-content detection
//! - `numbering`: absolute verse numbering
//! - `quirks`: per-module quirk profiles
//! - `memory`: in-memory backend for tests, benches and fixtures

pub mod cursor;
pub mod memory;
pub mod numbering;
pub mod quirks;
pub mod traits;
