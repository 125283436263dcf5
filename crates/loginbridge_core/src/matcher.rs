//! Credential matching.
//!
//! Resolves a [`SearchQuery`] against the open database. A query either names
//! one entry by id, or is matched against each entry's site URL, form action
//! URL and HTTP realm. Exactness is judged against the caller's untruncated
//! URLs; candidate selection uses the truncated ones.

use crate::entry::{EntryId, NativeEntry};
use crate::error::{CoreError, CoreResult};
use crate::mapper::FieldMapper;
use crate::store::{EntryStore, UrlPattern};
use loginbridge_protocol::{CredentialEntry, SearchQuery, SearchType};
use std::sync::Arc;
use tracing::trace;

/// Truncates a URL to scheme, host and port.
///
/// Input without `"://"` is returned unchanged.
///
/// ```rust
/// use loginbridge_core::normalize_url;
///
/// assert_eq!(normalize_url("https://example.com:8443/login?x=1"), "https://example.com:8443");
/// assert_eq!(normalize_url("example.com/login"), "example.com/login");
/// ```
pub fn normalize_url(url: &str) -> &str {
    let Some(scheme_end) = url.find("://").map(|i| i + 3) else {
        return url;
    };
    match url[scheme_end..].find('/') {
        Some(path_start) => &url[..scheme_end + path_start],
        None => url,
    }
}

/// Anything that can count logins for a query.
///
/// Implemented by the match engine over the open database and by the plaintext
/// URL index.
pub trait LoginCounter: Send + Sync {
    /// Counts logins matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing source cannot be read.
    fn count_logins(&self, query: &SearchQuery) -> CoreResult<usize>;
}

/// A query with its URLs in both full and truncated form.
struct PreparedQuery<'a> {
    full_hostname: &'a str,
    full_action_url: &'a str,
    hostname: &'a str,
    action_url: &'a str,
    http_realm: &'a str,
    search_type: SearchType,
    require_full: bool,
}

impl<'a> PreparedQuery<'a> {
    fn new(query: &'a SearchQuery) -> Self {
        Self {
            full_hostname: &query.hostname,
            full_action_url: &query.action_url,
            hostname: normalize_url(&query.hostname),
            action_url: normalize_url(&query.action_url),
            http_realm: &query.http_realm,
            search_type: query.search_type,
            require_full: query.require_full_url_match,
        }
    }

    fn url_pattern(&self) -> CoreResult<UrlPattern> {
        if self.hostname.is_empty() {
            Ok(UrlPattern::any())
        } else if self.require_full {
            UrlPattern::exact(self.full_hostname)
        } else {
            UrlPattern::containing(self.hostname)
        }
    }

    /// Returns `None` if `entry` does not match, otherwise its exactness.
    fn evaluate(&self, entry: &NativeEntry) -> Option<bool> {
        let url_is_exact = entry.url() == self.full_hostname;
        let mut matched = false;
        let mut exact = false;

        let form_url = entry.form_match_url();
        if self.search_type != SearchType::ExcludeForms
            && !form_url.is_empty()
            && (self.action_url.is_empty() || form_url.contains(self.action_url))
        {
            if form_url == self.full_action_url && url_is_exact {
                matched = true;
                exact = true;
            } else if !self.require_full {
                matched = true;
            }
        }

        let realm = entry.http_realm();
        if self.search_type != SearchType::ExcludeRealms
            && !realm.is_empty()
            && (self.http_realm.is_empty() || realm == self.http_realm)
        {
            if url_is_exact {
                matched = true;
                exact = true;
            } else if !self.require_full {
                matched = true;
            }
        }

        matched.then_some(exact)
    }
}

/// Resolves login searches against an [`EntryStore`].
///
/// The store must already be open; callers apply the open-wait coordinator
/// first. Every operation returns `DatabaseClosed` otherwise.
#[derive(Clone)]
pub struct MatchEngine {
    store: Arc<dyn EntryStore>,
}

impl MatchEngine {
    /// Creates an engine over `store`.
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self { store }
    }

    /// Returns the store.
    pub fn store(&self) -> &Arc<dyn EntryStore> {
        &self.store
    }

    fn mapper(&self) -> FieldMapper {
        FieldMapper::new(self.store.memory_protection())
    }

    /// Finds matching logins in scan order.
    ///
    /// # Errors
    ///
    /// A non-empty unique id that is malformed or names no entry is an error,
    /// not an empty result. Also fails with `DatabaseClosed`.
    pub fn find_logins(&self, query: &SearchQuery) -> CoreResult<Vec<CredentialEntry>> {
        let mapper = self.mapper();
        Ok(self
            .matching_entries(query)?
            .iter()
            .map(|(entry, exact)| mapper.to_wire(entry, *exact))
            .collect())
    }

    /// Returns every login in the database, none flagged exact.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseClosed` if no database is open.
    pub fn all_logins(&self) -> CoreResult<Vec<CredentialEntry>> {
        self.ensure_open()?;
        let mapper = self.mapper();
        Ok(self
            .store
            .entries()?
            .iter()
            .map(|entry| mapper.to_wire(entry, false))
            .collect())
    }

    /// Looks up one entry by its unique id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUniqueId` or `EntryNotFound` when the id does not
    /// resolve.
    pub fn find_entry(&self, unique_id: &str) -> CoreResult<NativeEntry> {
        self.ensure_open()?;
        let id = EntryId::from_hex(unique_id)?;
        self.store
            .find(&id)?
            .ok_or_else(|| CoreError::entry_not_found(unique_id))
    }

    fn ensure_open(&self) -> CoreResult<()> {
        if self.store.is_open() {
            Ok(())
        } else {
            Err(CoreError::DatabaseClosed)
        }
    }

    fn matching_entries(&self, query: &SearchQuery) -> CoreResult<Vec<(NativeEntry, bool)>> {
        if let Some(unique_id) = query.unique_id() {
            return Ok(vec![(self.find_entry(unique_id)?, true)]);
        }
        self.ensure_open()?;

        let prepared = PreparedQuery::new(query);
        let candidates = self.store.search_urls(&prepared.url_pattern()?)?;
        trace!(
            hostname = prepared.hostname,
            candidates = candidates.len(),
            "matching logins"
        );

        Ok(candidates
            .into_iter()
            .filter_map(|entry| prepared.evaluate(&entry).map(|exact| (entry, exact)))
            .collect())
    }
}

impl LoginCounter for MatchEngine {
    /// Counts by host, action URL and realm. A unique id on `query` is ignored.
    fn count_logins(&self, query: &SearchQuery) -> CoreResult<usize> {
        let query = SearchQuery {
            unique_id: None,
            ..query.clone()
        };
        Ok(self.matching_entries(&query)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{schema, ProtectedString};
    use crate::store::MemoryStore;

    fn entry(url: &str, form: &str, realm: &str) -> NativeEntry {
        let mut entry = NativeEntry::new();
        entry.strings.set(schema::URL, ProtectedString::plain(url));
        if !form.is_empty() {
            entry
                .strings
                .set(schema::FORM_MATCH_URL, ProtectedString::plain(form));
        }
        if !realm.is_empty() {
            entry
                .strings
                .set(schema::FORM_HTTP_REALM, ProtectedString::plain(realm));
        }
        entry
    }

    fn engine(entries: Vec<NativeEntry>) -> MatchEngine {
        MatchEngine::new(Arc::new(MemoryStore::open_with("test", entries)))
    }

    fn form_entry() -> NativeEntry {
        entry("https://example.com", "https://example.com/login", "")
    }

    #[test]
    fn normalize() {
        assert_eq!(normalize_url("https://example.com/a/b"), "https://example.com");
        assert_eq!(normalize_url("https://example.com"), "https://example.com");
        assert_eq!(normalize_url("https://example.com/"), "https://example.com");
        assert_eq!(normalize_url("example.com/path"), "example.com/path");
        assert_eq!(normalize_url(""), "");
        assert_eq!(normalize_url("file:///etc/passwd"), "file://");
    }

    #[test]
    fn exact_match_with_full_urls() {
        let engine = engine(vec![form_entry()]);
        let query = SearchQuery::new("https://example.com")
            .with_action_url("https://example.com/login")
            .require_full_url_match(true);

        let logins = engine.find_logins(&query).unwrap();
        assert_eq!(logins.len(), 1);
        assert!(logins[0].is_exact_match);
    }

    #[test]
    fn partial_match_without_scheme() {
        let engine = engine(vec![form_entry()]);
        let query = SearchQuery::new("example.com");

        let logins = engine.find_logins(&query).unwrap();
        assert_eq!(logins.len(), 1);
        assert!(!logins[0].is_exact_match);
    }

    #[test]
    fn full_match_rejects_partial() {
        let engine = engine(vec![form_entry()]);
        let query = SearchQuery::new("https://example.com")
            .with_action_url("https://example.com/other")
            .require_full_url_match(true);
        assert_eq!(engine.count_logins(&query).unwrap(), 0);
    }

    #[test]
    fn hostname_path_is_ignored_for_candidates_but_not_exactness() {
        let engine = engine(vec![form_entry()]);
        let query = SearchQuery::new("https://example.com/some/page")
            .with_action_url("https://example.com/login");

        let logins = engine.find_logins(&query).unwrap();
        assert_eq!(logins.len(), 1);
        assert!(!logins[0].is_exact_match);
    }

    #[test]
    fn action_url_filters_forms() {
        let engine = engine(vec![
            form_entry(),
            entry("https://example.com", "https://auth.example.net/sso", ""),
        ]);
        let query = SearchQuery::new("https://example.com").with_action_url("https://auth.example.net/x");
        let logins = engine.find_logins(&query).unwrap();
        assert_eq!(logins.len(), 1);
        assert_eq!(logins[0].form_action_url, "https://auth.example.net/sso");
    }

    #[test]
    fn exclude_forms_drops_form_only_entry() {
        let engine = engine(vec![form_entry()]);
        let query = SearchQuery::new("https://example.com").with_search_type(SearchType::ExcludeForms);
        assert_eq!(engine.count_logins(&query).unwrap(), 0);
    }

    #[test]
    fn realm_match() {
        let engine = engine(vec![entry("https://intranet.example", "", "Staff")]);

        let exact = SearchQuery::new("https://intranet.example").with_http_realm("Staff");
        let logins = engine.find_logins(&exact).unwrap();
        assert_eq!(logins.len(), 1);
        assert!(logins[0].is_exact_match);

        let other_realm = SearchQuery::new("https://intranet.example").with_http_realm("Admins");
        assert_eq!(engine.count_logins(&other_realm).unwrap(), 0);

        let excluded = SearchQuery::new("https://intranet.example")
            .with_search_type(SearchType::ExcludeRealms);
        assert_eq!(engine.count_logins(&excluded).unwrap(), 0);
    }

    #[test]
    fn entry_without_form_or_realm_never_matches() {
        let engine = engine(vec![entry("https://example.com", "", "")]);
        assert_eq!(engine.count_logins(&SearchQuery::new("")).unwrap(), 0);
    }

    #[test]
    fn empty_hostname_matches_everything_in_scan_order() {
        let engine = engine(vec![
            entry("https://b.example", "https://b.example/login", ""),
            entry("https://a.example", "", "Realm"),
        ]);
        let logins = engine.find_logins(&SearchQuery::new("")).unwrap();
        let hosts: Vec<_> = logins.iter().map(|l| l.host_name.as_str()).collect();
        assert_eq!(hosts, vec!["https://b.example", "https://a.example"]);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let engine = engine(vec![form_entry()]);
        assert_eq!(engine.count_logins(&SearchQuery::new("EXAMPLE.com")).unwrap(), 0);
    }

    #[test]
    fn unique_id_fast_path() {
        let target = entry("https://other.example", "", "");
        let id = target.id().to_hex();
        let engine = engine(vec![form_entry(), target]);

        let query = SearchQuery {
            unique_id: Some(id.clone()),
            ..SearchQuery::new("https://example.com").with_search_type(SearchType::ExcludeForms)
        };
        let logins = engine.find_logins(&query).unwrap();
        assert_eq!(logins.len(), 1);
        assert!(logins[0].is_exact_match);
        assert_eq!(logins[0].unique_id, id);
    }

    #[test]
    fn count_ignores_unique_id() {
        let target = entry("https://other.example", "https://other.example/login", "");
        let engine = engine(vec![form_entry(), target.clone()]);

        let resolvable = SearchQuery {
            unique_id: Some(target.id().to_hex()),
            ..SearchQuery::new("https://example.com")
        };
        assert_eq!(engine.count_logins(&resolvable).unwrap(), 1);

        let missing = SearchQuery {
            unique_id: Some("00".repeat(16)),
            ..SearchQuery::new("")
        };
        assert_eq!(engine.count_logins(&missing).unwrap(), 2);
    }

    #[test]
    fn unresolvable_unique_id_is_an_error() {
        let engine = engine(vec![form_entry()]);

        let missing = SearchQuery::by_unique_id("00".repeat(16));
        assert!(matches!(
            engine.find_logins(&missing),
            Err(CoreError::EntryNotFound { .. })
        ));

        let malformed = SearchQuery::by_unique_id("not-hex");
        assert!(matches!(
            engine.find_logins(&malformed),
            Err(CoreError::InvalidUniqueId { .. })
        ));
    }

    #[test]
    fn closed_store_is_reported() {
        let store = Arc::new(MemoryStore::with_entries("db", vec![form_entry()]));
        let engine = MatchEngine::new(store);
        assert!(matches!(
            engine.find_logins(&SearchQuery::new("")),
            Err(CoreError::DatabaseClosed)
        ));
        assert!(matches!(
            engine.find_logins(&SearchQuery::by_unique_id("00".repeat(16))),
            Err(CoreError::DatabaseClosed)
        ));
        assert!(matches!(engine.all_logins(), Err(CoreError::DatabaseClosed)));
    }

    #[test]
    fn all_logins_are_never_exact() {
        let engine = engine(vec![form_entry(), entry("", "", "")]);
        let logins = engine.all_logins().unwrap();
        assert_eq!(logins.len(), 2);
        assert!(logins.iter().all(|l| !l.is_exact_match));
    }
}
