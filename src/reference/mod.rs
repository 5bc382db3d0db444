//! Reference model
//!
//! Book/chapter/verse addresses: parsing, canonical ordering, boundary
//! comparisons and range expansion.

mod parser;
mod range;
mod types;

pub use parser::parse;
pub use range::{parse_range, references_from_range};
pub use types::{
    book_order, new_testament_books, old_testament_books, Reference, BOOKS, OT_BOOK_COUNT,
};
