//! Entry store adapter.
//!
//! The password database itself is an external collaborator. The core talks
//! to it only through [`EntryStore`]: open/closed state, a URL search, lookup
//! by id, insert/update and save. Two reference adapters are provided:
//! [`MemoryStore`] for tests and embedding, [`JsonFileStore`] for the CLI.

mod json;
mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

use crate::config::MemoryProtection;
use crate::entry::{EntryId, NativeEntry};
use crate::error::CoreResult;
use regex_lite::Regex;
use std::path::{Path, PathBuf};

/// A case-sensitive pattern tested against an entry's `URL` attribute.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    regex: Option<Regex>,
}

impl UrlPattern {
    /// Matches every URL, including an empty one.
    pub fn any() -> Self {
        Self { regex: None }
    }

    /// Matches only a URL equal to `url`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` if the escaped pattern fails to compile.
    pub fn exact(url: &str) -> CoreResult<Self> {
        let regex = Regex::new(&format!("^{}$", regex_lite::escape(url)))?;
        Ok(Self { regex: Some(regex) })
    }

    /// Matches any URL containing `url`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` if the escaped pattern fails to compile.
    pub fn containing(url: &str) -> CoreResult<Self> {
        let regex = Regex::new(&regex_lite::escape(url))?;
        Ok(Self { regex: Some(regex) })
    }

    /// Tests `url` against the pattern.
    pub fn is_match(&self, url: &str) -> bool {
        self.regex.as_ref().map_or(true, |regex| regex.is_match(url))
    }
}

/// The password database as seen by the core.
///
/// Implementations own open/closed state, entry storage and persistence.
/// Every method takes `&self`; implementations synchronise internally.
///
/// Entry-touching methods return `DatabaseClosed` while no database is open.
pub trait EntryStore: Send + Sync {
    /// Returns true if a database is open.
    fn is_open(&self) -> bool;

    /// Name of the open database, `None` when closed.
    fn name(&self) -> Option<String>;

    /// Location of the open database, `None` when closed or in memory.
    fn path(&self) -> Option<PathBuf>;

    /// Protection policy applied to written attributes.
    fn memory_protection(&self) -> MemoryProtection;

    /// Opens the database at `path`, or the last used one when `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if there is nothing to open or loading fails.
    fn open(&self, path: Option<&Path>) -> CoreResult<()>;

    /// Closes the open database. Closing a closed store is a no-op.
    fn close(&self);

    /// Returns entries whose `URL` matches `pattern`, in store order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseClosed` if no database is open.
    fn search_urls(&self, pattern: &UrlPattern) -> CoreResult<Vec<NativeEntry>>;

    /// Looks up an entry by id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseClosed` if no database is open.
    fn find(&self, id: &EntryId) -> CoreResult<Option<NativeEntry>>;

    /// Returns every entry in store order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseClosed` if no database is open.
    fn entries(&self) -> CoreResult<Vec<NativeEntry>> {
        self.search_urls(&UrlPattern::any())
    }

    /// Adds a new entry.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEntry` if the id is taken, `DatabaseClosed` if closed.
    fn insert(&self, entry: NativeEntry) -> CoreResult<()>;

    /// Replaces the entry with the same id.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if no entry has this id, `DatabaseClosed` if closed.
    fn update(&self, entry: NativeEntry) -> CoreResult<()>;

    /// Persists the open database.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or no database is open.
    fn save(&self) -> CoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_matches_everything() {
        let pattern = UrlPattern::any();
        assert!(pattern.is_match(""));
        assert!(pattern.is_match("https://example.com"));
    }

    #[test]
    fn exact_is_anchored_and_escaped() {
        let pattern = UrlPattern::exact("https://a.example").unwrap();
        assert!(pattern.is_match("https://a.example"));
        assert!(!pattern.is_match("https://a.example:8080"));
        assert!(!pattern.is_match("https://aXexample"));
    }

    #[test]
    fn containing_is_case_sensitive_substring() {
        let pattern = UrlPattern::containing("example.com").unwrap();
        assert!(pattern.is_match("https://example.com"));
        assert!(pattern.is_match("http://www.example.com:81"));
        assert!(!pattern.is_match("https://EXAMPLE.com"));
        assert!(!pattern.is_match("https://exampleXcom"));
    }
}
