//! Native entries.
//!
//! A native entry is the password database's own record: an id plus an
//! insertion-ordered bag of string values, each carrying a protection flag.
//! Well-known attributes are read through typed accessors so that key names
//! stay in [`schema`].

mod id;
pub mod schema;

pub use id::EntryId;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A string value with the store's in-memory protection flag.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedString {
    value: String,
    protected: bool,
}

impl ProtectedString {
    /// Creates a value with an explicit protection flag.
    pub fn new(value: impl Into<String>, protected: bool) -> Self {
        Self {
            value: value.into(),
            protected,
        }
    }

    /// Creates an unprotected value.
    pub fn plain(value: impl Into<String>) -> Self {
        Self::new(value, false)
    }

    /// Returns the value.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns true if the store protects this value.
    pub fn is_protected(&self) -> bool {
        self.protected
    }
}

impl fmt::Debug for ProtectedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.protected {
            f.write_str("ProtectedString(***)")
        } else {
            write!(f, "ProtectedString({:?})", self.value)
        }
    }
}

/// Insertion-ordered string attributes of an entry.
///
/// Setting an existing key replaces its value in place and keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryStrings(Vec<(String, ProtectedString)>);

impl EntryStrings {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&ProtectedString> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns the value under `key`, or an empty string when absent.
    pub fn read_safe(&self, key: &str) -> &str {
        self.get(key).map(ProtectedString::as_str).unwrap_or("")
    }

    /// Returns true if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Sets `key`, replacing any previous value in place.
    pub fn set(&mut self, key: impl Into<String>, value: ProtectedString) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((key, value)),
        }
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<ProtectedString> {
        let index = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(index).1)
    }

    /// Iterates over attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProtectedString)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One entry of the password database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeEntry {
    id: EntryId,
    /// String attributes.
    pub strings: EntryStrings,
}

impl NativeEntry {
    /// Creates an empty entry with a fresh id.
    pub fn new() -> Self {
        Self::with_id(EntryId::new())
    }

    /// Creates an empty entry with the given id.
    pub fn with_id(id: EntryId) -> Self {
        Self {
            id,
            strings: EntryStrings::new(),
        }
    }

    /// Returns the entry id.
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Site URL.
    pub fn url(&self) -> &str {
        self.strings.read_safe(schema::URL)
    }

    /// Form action URL.
    pub fn form_match_url(&self) -> &str {
        self.strings.read_safe(schema::FORM_MATCH_URL)
    }

    /// HTTP realm.
    pub fn http_realm(&self) -> &str {
        self.strings.read_safe(schema::FORM_HTTP_REALM)
    }

    /// Title, falling back to the legacy lowercase key.
    pub fn title(&self) -> &str {
        match self.strings.get(schema::TITLE) {
            Some(title) => title.as_str(),
            None => self.strings.read_safe(schema::LEGACY_TITLE),
        }
    }

    /// Reserved user name.
    pub fn username(&self) -> &str {
        self.strings.read_safe(schema::USER_NAME)
    }

    /// Reserved password.
    pub fn password(&self) -> &str {
        self.strings.read_safe(schema::PASSWORD)
    }
}

impl Default for NativeEntry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_in_place() {
        let mut strings = EntryStrings::new();
        strings.set("a", ProtectedString::plain("1"));
        strings.set("b", ProtectedString::plain("2"));
        strings.set("a", ProtectedString::plain("3"));

        let keys: Vec<_> = strings.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(strings.read_safe("a"), "3");
    }

    #[test]
    fn read_safe_missing_is_empty() {
        let strings = EntryStrings::new();
        assert_eq!(strings.read_safe("missing"), "");
        assert!(!strings.contains_key("missing"));
    }

    #[test]
    fn remove() {
        let mut strings = EntryStrings::new();
        strings.set("a", ProtectedString::plain("1"));
        assert_eq!(strings.remove("a").map(|v| v.as_str().to_string()), Some("1".into()));
        assert!(strings.is_empty());
        assert!(strings.remove("a").is_none());
    }

    #[test]
    fn protected_debug_hides_value() {
        let secret = ProtectedString::new("hunter2", true);
        assert!(!format!("{secret:?}").contains("hunter2"));
        assert!(format!("{:?}", ProtectedString::plain("visible")).contains("visible"));
    }

    #[test]
    fn title_falls_back_to_legacy_key() {
        let mut entry = NativeEntry::new();
        entry.strings.set(schema::LEGACY_TITLE, ProtectedString::plain("old"));
        assert_eq!(entry.title(), "old");

        entry.strings.set(schema::TITLE, ProtectedString::plain("new"));
        assert_eq!(entry.title(), "new");
    }

    #[test]
    fn accessors() {
        let mut entry = NativeEntry::new();
        entry.strings.set(schema::URL, ProtectedString::plain("https://a.example"));
        entry.strings.set(schema::PASSWORD, ProtectedString::new("pw", true));
        assert_eq!(entry.url(), "https://a.example");
        assert_eq!(entry.password(), "pw");
        assert_eq!(entry.http_realm(), "");
    }
}
