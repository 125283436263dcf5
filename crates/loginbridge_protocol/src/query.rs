//! Search queries for find/count operations.

use serde::{Deserialize, Serialize};

/// Restricts which kinds of login a search considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchType {
    /// Form logins and HTTP realm logins.
    #[default]
    All,
    /// Ignore form logins.
    ExcludeForms,
    /// Ignore HTTP realm logins.
    ExcludeRealms,
}

/// A login search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Site URL. Empty matches every entry.
    pub hostname: String,
    /// Form action URL. Empty matches every form.
    pub action_url: String,
    /// HTTP realm. Empty matches every realm.
    pub http_realm: String,
    /// Which login kinds to consider.
    pub search_type: SearchType,
    /// Only accept entries whose URLs equal the query's full URLs.
    pub require_full_url_match: bool,
    /// Direct lookup by entry id; bypasses URL matching when non-empty.
    pub unique_id: Option<String>,
}

impl SearchQuery {
    /// Creates a query for a site.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ..Self::default()
        }
    }

    /// Creates a direct lookup by entry id.
    pub fn by_unique_id(unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: Some(unique_id.into()),
            ..Self::default()
        }
    }

    /// Sets the action URL.
    pub fn with_action_url(mut self, action_url: impl Into<String>) -> Self {
        self.action_url = action_url.into();
        self
    }

    /// Sets the HTTP realm.
    pub fn with_http_realm(mut self, realm: impl Into<String>) -> Self {
        self.http_realm = realm.into();
        self
    }

    /// Sets the search type.
    pub fn with_search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = search_type;
        self
    }

    /// Requires full URL matches.
    pub fn require_full_url_match(mut self, value: bool) -> Self {
        self.require_full_url_match = value;
        self
    }

    /// Returns the unique id if one was supplied and is non-empty.
    pub fn unique_id(&self) -> Option<&str> {
        self.unique_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_unique_id_is_ignored() {
        let query = SearchQuery {
            unique_id: Some(String::new()),
            ..SearchQuery::new("https://example.com")
        };
        assert_eq!(query.unique_id(), None);
        assert_eq!(SearchQuery::by_unique_id("ab").unique_id(), Some("ab"));
    }

    #[test]
    fn builder() {
        let query = SearchQuery::new("https://example.com")
            .with_action_url("https://example.com/login")
            .with_search_type(SearchType::ExcludeRealms)
            .require_full_url_match(true);
        assert_eq!(query.search_type, SearchType::ExcludeRealms);
        assert!(query.require_full_url_match);
        assert!(query.http_realm.is_empty());
    }
}
