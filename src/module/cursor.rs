//! Verse cursor adapter
//!
//! Thin wrapper over a module driver's position cursor. The underlying
//! engine has no explicit end-of-content signal: advancing past the last
//! entry leaves the cursor in place, so the walk is over once the same
//! short-form reference is read twice in a row. This adapter tracks the
//! previously read key and exposes that condition directly.

use crate::module::traits::ModuleDriver;
use crate::reference::Reference;

pub struct VerseCursor<'d> {
    driver: &'d mut dyn ModuleDriver,
    last_key: Option<String>,
}

impl<'d> VerseCursor<'d> {
    pub fn new(driver: &'d mut dyn ModuleDriver) -> Self {
        Self {
            driver,
            last_key: None,
        }
    }

    /// Position the cursor and reset end detection
    pub fn seek(&mut self, reference: &Reference) {
        self.driver.set_position(reference);
        self.last_key = None;
    }

    pub fn current(&self) -> Reference {
        self.driver.current_reference()
    }

    /// Canonical short form of the current position
    pub fn current_key(&self) -> String {
        self.driver.current_reference().to_string()
    }

    /// True once the cursor reports the same key twice in a row
    pub fn end_reached(&self) -> bool {
        match &self.last_key {
            Some(last) => *last == self.current_key(),
            None => false,
        }
    }

    pub fn raw_entry(&self) -> String {
        self.driver.current_raw_entry()
    }

    pub fn stripped_entry(&self) -> String {
        self.driver.current_stripped_entry()
    }

    /// Whether the current position holds any content.
    ///
    /// Absence is signaled by an empty stripped entry rather than an
    /// explicit flag; this mirrors the external engine's behavior.
    pub fn has_entry(&self) -> bool {
        !self.driver.current_stripped_entry().trim().is_empty()
    }

    /// Record the current key and move to the next canonical verse
    pub fn advance(&mut self) {
        self.last_key = Some(self.current_key());
        self.driver.advance();
    }

    /// Fetch the introduction entry for the given chapter, restoring the
    /// cursor position afterwards. Used for chapter headings (verse 0).
    pub fn intro_entry(&mut self, book: &str, chapter: u32) -> String {
        let saved = self.driver.current_reference();
        self.driver
            .set_position(&Reference::new(book.to_string(), chapter, 0));
        let entry = self.driver.current_raw_entry();
        self.driver.set_position(&saved);
        entry.trim().to_string()
    }

    pub fn driver(&mut self) -> &mut dyn ModuleDriver {
        self.driver
    }
}
