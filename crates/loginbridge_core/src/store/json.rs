//! JSON file entry store.
//!
//! A whole database is one JSON document holding its name and entries. The
//! document is loaded on open and rewritten on save.

use super::{EntryStore, UrlPattern};
use crate::config::MemoryProtection;
use crate::entry::{EntryId, NativeEntry};
use crate::error::{CoreError, CoreResult};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// On-disk form of a database.
#[derive(Debug, Default, Serialize, Deserialize)]
struct VaultDocument {
    name: String,
    #[serde(default)]
    memory_protection: Option<MemoryProtection>,
    #[serde(default)]
    entries: Vec<NativeEntry>,
}

#[derive(Debug, Default)]
struct JsonState {
    /// Path of the open database; `None` while closed.
    open_path: Option<PathBuf>,
    last_used: Option<PathBuf>,
    document: VaultDocument,
}

impl JsonState {
    fn open_path(&self) -> CoreResult<&Path> {
        self.open_path.as_deref().ok_or(CoreError::DatabaseClosed)
    }
}

/// An entry store backed by a JSON file.
#[derive(Debug, Default)]
pub struct JsonFileStore {
    state: RwLock<JsonState>,
}

impl JsonFileStore {
    /// Creates a closed store with no last used database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a closed store that reopens `path` when asked for the last used
    /// database.
    #[must_use]
    pub fn with_last_used(path: impl Into<PathBuf>) -> Self {
        let store = Self::new();
        store.state.write().last_used = Some(path.into());
        store
    }

    /// Writes a new empty database to `path` and opens it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn create(path: impl Into<PathBuf>, name: impl Into<String>) -> CoreResult<Self> {
        let path = path.into();
        let document = VaultDocument {
            name: name.into(),
            ..VaultDocument::default()
        };
        write_document(&path, &document)?;

        let store = Self::new();
        {
            let mut state = store.state.write();
            state.open_path = Some(path.clone());
            state.last_used = Some(path);
            state.document = document;
        }
        Ok(store)
    }

    /// Opens `path`, creating an empty database named after the file stem if
    /// it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or created.
    pub fn open_or_create(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        if path.exists() {
            let store = Self::new();
            store.open(Some(&path))?;
            Ok(store)
        } else {
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            Self::create(path, name)
        }
    }
}

fn write_document(path: &Path, document: &VaultDocument) -> CoreResult<()> {
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let data = serde_json::to_vec_pretty(document)?;
    let written = File::create(&temp_path)
        .and_then(|mut file| {
            file.write_all(&data)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&temp_path, path));

    if let Err(e) = written {
        if temp_path.exists() && fs::remove_file(&temp_path).is_err() {
            debug!(path = %temp_path.display(), "could not remove temporary vault file");
        }
        return Err(e.into());
    }
    Ok(())
}

impl EntryStore for JsonFileStore {
    fn is_open(&self) -> bool {
        self.state.read().open_path.is_some()
    }

    fn name(&self) -> Option<String> {
        let state = self.state.read();
        state
            .open_path
            .as_ref()
            .map(|_| state.document.name.clone())
    }

    fn path(&self) -> Option<PathBuf> {
        self.state.read().open_path.clone()
    }

    fn memory_protection(&self) -> MemoryProtection {
        self.state
            .read()
            .document
            .memory_protection
            .unwrap_or_default()
    }

    fn open(&self, path: Option<&Path>) -> CoreResult<()> {
        let target = match path {
            Some(path) => path.to_path_buf(),
            None => self
                .state
                .read()
                .last_used
                .clone()
                .ok_or_else(|| CoreError::invalid_operation("no last used database"))?,
        };

        let data = fs::read(&target)?;
        let document: VaultDocument = serde_json::from_slice(&data)?;
        debug!(path = %target.display(), entries = document.entries.len(), "opened database");

        let mut state = self.state.write();
        state.document = document;
        state.last_used = Some(target.clone());
        state.open_path = Some(target);
        Ok(())
    }

    fn close(&self) {
        let mut state = self.state.write();
        state.open_path = None;
        state.document = VaultDocument::default();
    }

    fn search_urls(&self, pattern: &UrlPattern) -> CoreResult<Vec<NativeEntry>> {
        let state = self.state.read();
        state.open_path()?;
        Ok(state
            .document
            .entries
            .iter()
            .filter(|entry| pattern.is_match(entry.url()))
            .cloned()
            .collect())
    }

    fn find(&self, id: &EntryId) -> CoreResult<Option<NativeEntry>> {
        let state = self.state.read();
        state.open_path()?;
        Ok(state
            .document
            .entries
            .iter()
            .find(|entry| entry.id() == *id)
            .cloned())
    }

    fn insert(&self, entry: NativeEntry) -> CoreResult<()> {
        let mut state = self.state.write();
        state.open_path()?;
        if state.document.entries.iter().any(|e| e.id() == entry.id()) {
            return Err(CoreError::DuplicateEntry {
                unique_id: entry.id().to_hex(),
            });
        }
        state.document.entries.push(entry);
        Ok(())
    }

    fn update(&self, entry: NativeEntry) -> CoreResult<()> {
        let mut state = self.state.write();
        state.open_path()?;
        let slot = state
            .document
            .entries
            .iter_mut()
            .find(|e| e.id() == entry.id())
            .ok_or_else(|| CoreError::entry_not_found(entry.id().to_hex()))?;
        *slot = entry;
        Ok(())
    }

    fn save(&self) -> CoreResult<()> {
        let state = self.state.read();
        let path = state.open_path()?;
        write_document(path, &state.document)?;
        debug!(path = %path.display(), "saved database");
        Ok(())
    }
}
