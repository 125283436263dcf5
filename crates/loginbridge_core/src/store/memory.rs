//! In-memory entry store.

use super::{EntryStore, UrlPattern};
use crate::config::MemoryProtection;
use crate::entry::{EntryId, NativeEntry};
use crate::error::{CoreError, CoreResult};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
struct MemoryState {
    open: bool,
    name: String,
    path: Option<PathBuf>,
    entries: Vec<NativeEntry>,
    saves: usize,
}

impl MemoryState {
    fn ensure_open(&self) -> CoreResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(CoreError::DatabaseClosed)
        }
    }
}

/// An entry store held entirely in memory.
///
/// Entries survive `close`/`open` cycles, so a test can close the store, park a
/// caller on the open-wait coordinator and reopen it. Saves are only counted.
///
/// # Example
///
/// ```rust
/// use loginbridge_core::{EntryStore, MemoryStore, NativeEntry};
///
/// let store = MemoryStore::open_with("Personal", vec![NativeEntry::new()]);
/// assert!(store.is_open());
/// assert_eq!(store.entries().unwrap().len(), 1);
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    protection: MemoryProtection,
}

impl MemoryStore {
    /// Creates a closed, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            protection: MemoryProtection::default(),
        }
    }

    /// Creates a closed store holding `entries`.
    #[must_use]
    pub fn with_entries(name: impl Into<String>, entries: Vec<NativeEntry>) -> Self {
        let store = Self::new();
        {
            let mut state = store.state.write();
            state.name = name.into();
            state.entries = entries;
        }
        store
    }

    /// Creates an open store holding `entries`.
    #[must_use]
    pub fn open_with(name: impl Into<String>, entries: Vec<NativeEntry>) -> Self {
        let store = Self::with_entries(name, entries);
        store.state.write().open = true;
        store
    }

    /// Replaces the protection policy.
    #[must_use]
    pub fn with_memory_protection(mut self, protection: MemoryProtection) -> Self {
        self.protection = protection;
        self
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.state.read().saves
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryStore for MemoryStore {
    fn is_open(&self) -> bool {
        self.state.read().open
    }

    fn name(&self) -> Option<String> {
        let state = self.state.read();
        state.open.then(|| state.name.clone())
    }

    fn path(&self) -> Option<PathBuf> {
        let state = self.state.read();
        if state.open {
            state.path.clone()
        } else {
            None
        }
    }

    fn memory_protection(&self) -> MemoryProtection {
        self.protection
    }

    fn open(&self, path: Option<&Path>) -> CoreResult<()> {
        let mut state = self.state.write();
        if let Some(path) = path {
            state.path = Some(path.to_path_buf());
        }
        state.open = true;
        Ok(())
    }

    fn close(&self) {
        self.state.write().open = false;
    }

    fn search_urls(&self, pattern: &UrlPattern) -> CoreResult<Vec<NativeEntry>> {
        let state = self.state.read();
        state.ensure_open()?;
        Ok(state
            .entries
            .iter()
            .filter(|entry| pattern.is_match(entry.url()))
            .cloned()
            .collect())
    }

    fn find(&self, id: &EntryId) -> CoreResult<Option<NativeEntry>> {
        let state = self.state.read();
        state.ensure_open()?;
        Ok(state.entries.iter().find(|entry| entry.id() == *id).cloned())
    }

    fn insert(&self, entry: NativeEntry) -> CoreResult<()> {
        let mut state = self.state.write();
        state.ensure_open()?;
        if state.entries.iter().any(|e| e.id() == entry.id()) {
            return Err(CoreError::DuplicateEntry {
                unique_id: entry.id().to_hex(),
            });
        }
        state.entries.push(entry);
        Ok(())
    }

    fn update(&self, entry: NativeEntry) -> CoreResult<()> {
        let mut state = self.state.write();
        state.ensure_open()?;
        let slot = state
            .entries
            .iter_mut()
            .find(|e| e.id() == entry.id())
            .ok_or_else(|| CoreError::entry_not_found(entry.id().to_hex()))?;
        *slot = entry;
        Ok(())
    }

    fn save(&self) -> CoreResult<()> {
        let mut state = self.state.write();
        state.ensure_open()?;
        state.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{schema, ProtectedString};

    fn entry_at(url: &str) -> NativeEntry {
        let mut entry = NativeEntry::new();
        entry.strings.set(schema::URL, ProtectedString::plain(url));
        entry
    }

    #[test]
    fn closed_store_rejects_access() {
        let store = MemoryStore::with_entries("db", vec![entry_at("https://a.example")]);
        assert!(!store.is_open());
        assert!(store.name().is_none());
        assert!(matches!(store.entries(), Err(CoreError::DatabaseClosed)));
        assert!(matches!(store.save(), Err(CoreError::DatabaseClosed)));
    }

    #[test]
    fn entries_survive_reopen() {
        let store = MemoryStore::open_with("db", vec![entry_at("https://a.example")]);
        store.close();
        store.open(None).unwrap();
        assert_eq!(store.entries().unwrap().len(), 1);
        assert_eq!(store.name().as_deref(), Some("db"));
    }

    #[test]
    fn search_filters_by_url() {
        let store = MemoryStore::open_with(
            "db",
            vec![entry_at("https://a.example"), entry_at("https://b.example")],
        );
        let hits = store
            .search_urls(&UrlPattern::containing("b.example").unwrap())
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url(), "https://b.example");
    }

    #[test]
    fn insert_update_find() {
        let store = MemoryStore::open_with("db", Vec::new());
        let mut entry = entry_at("https://a.example");
        store.insert(entry.clone()).unwrap();
        assert!(matches!(
            store.insert(entry.clone()),
            Err(CoreError::DuplicateEntry { .. })
        ));

        entry.strings.set(schema::TITLE, ProtectedString::plain("A"));
        store.update(entry.clone()).unwrap();
        assert_eq!(store.find(&entry.id()).unwrap().unwrap().title(), "A");

        let missing = NativeEntry::new();
        assert!(matches!(
            store.update(missing),
            Err(CoreError::EntryNotFound { .. })
        ));
    }

    #[test]
    fn save_is_counted() {
        let store = MemoryStore::open_with("db", Vec::new());
        store.save().unwrap();
        store.save().unwrap();
        assert_eq!(store.save_count(), 2);
    }

    #[test]
    fn open_records_path() {
        let store = MemoryStore::new();
        assert!(store.path().is_none());
        store.open(Some(Path::new("/tmp/vault.json"))).unwrap();
        assert_eq!(store.path(), Some(PathBuf::from("/tmp/vault.json")));
    }
}
