//! Plaintext URL index.
//!
//! When encryption of URLs is deliberately disabled, login counts come from a
//! side file of `url,action_url,realm` lines instead of the database. Counting
//! from the index does not need the database to be open.

use crate::error::CoreResult;
use crate::matcher::{normalize_url, LoginCounter};
use loginbridge_protocol::{SearchQuery, SearchType};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

/// One line of the index.
#[derive(Debug, Clone, PartialEq, Eq)]
struct IndexLine {
    url: String,
    action_url: String,
    realm: String,
}

impl IndexLine {
    /// Parses a line. Lines without exactly three comma-separated parts are
    /// rejected.
    fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split(',');
        let url = parts.next()?;
        let action_url = parts.next()?;
        let realm = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            url: url.to_string(),
            action_url: action_url.to_string(),
            realm: realm.to_string(),
        })
    }

    fn matches(&self, hostname: &str, action_url: &str, query: &SearchQuery) -> bool {
        if hostname.is_empty() {
            return true;
        }
        if !self.url.contains(hostname) {
            return false;
        }

        let has_form = !self.action_url.is_empty();
        if !(has_form && query.search_type == SearchType::ExcludeForms)
            && ((has_form && action_url.is_empty()) || self.action_url == action_url)
        {
            return true;
        }

        let has_realm = !self.realm.is_empty();
        !(has_realm && query.search_type == SearchType::ExcludeRealms)
            && ((has_realm && query.http_realm.is_empty()) || self.realm == query.http_realm)
    }
}

/// Counts logins from a plaintext index file.
///
/// The file is re-read on every count so that it tracks external writers.
#[derive(Debug, Clone)]
pub struct PlaintextUrlIndex {
    path: PathBuf,
}

impl PlaintextUrlIndex {
    /// Creates an index reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the index file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Counts index lines matching `query`.
    ///
    /// The unique id of the query is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn count(&self, query: &SearchQuery) -> CoreResult<usize> {
        let text = fs::read_to_string(&self.path)?;
        let hostname = normalize_url(&query.hostname);
        let action_url = normalize_url(&query.action_url);

        let count = text
            .lines()
            .filter_map(IndexLine::parse)
            .filter(|line| line.matches(hostname, action_url, query))
            .count();
        trace!(path = %self.path.display(), count, "counted plaintext index");
        Ok(count)
    }
}

impl LoginCounter for PlaintextUrlIndex {
    fn count_logins(&self, query: &SearchQuery) -> CoreResult<usize> {
        self.count(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use tempfile::tempdir;

    fn index(contents: &str) -> (tempfile::TempDir, PlaintextUrlIndex) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("urls.txt");
        fs::write(&path, contents).unwrap();
        (dir, PlaintextUrlIndex::new(path))
    }

    #[test]
    fn parse_requires_three_parts() {
        assert!(IndexLine::parse("a,b,c").is_some());
        assert!(IndexLine::parse(",,").is_some());
        assert!(IndexLine::parse("a,b").is_none());
        assert!(IndexLine::parse("a,b,c,d").is_none());
        assert!(IndexLine::parse("").is_none());
    }

    #[test]
    fn empty_hostname_counts_every_valid_line() {
        let (_dir, index) = index("a,b,c\nbroken\nx,,\n");
        assert_eq!(index.count(&SearchQuery::new("")).unwrap(), 2);
    }

    #[test]
    fn form_lines() {
        let (_dir, index) = index(
            "https://example.com,https://example.com,\n\
             https://example.com,https://auth.example.net,\n\
             https://other.org,https://other.org,\n",
        );

        let any_form = SearchQuery::new("https://example.com/page");
        assert_eq!(index.count(&any_form).unwrap(), 2);

        // An empty realm part equals an empty query realm, so pin the realm.
        let one_form = SearchQuery::new("https://example.com")
            .with_action_url("https://auth.example.net/post")
            .with_http_realm("Staff");
        assert_eq!(index.count(&one_form).unwrap(), 1);

        let no_forms = SearchQuery::new("https://example.com")
            .with_http_realm("Staff")
            .with_search_type(SearchType::ExcludeForms);
        assert_eq!(index.count(&no_forms).unwrap(), 0);
    }

    #[test]
    fn realm_lines() {
        let (_dir, index) = index("https://intranet.example,,Staff\n");
        let query = || SearchQuery::new("intranet").with_action_url("https://sso.example/post");

        assert_eq!(index.count(&query()).unwrap(), 1);
        assert_eq!(index.count(&query().with_http_realm("Staff")).unwrap(), 1);
        assert_eq!(index.count(&query().with_http_realm("Admins")).unwrap(), 0);
        assert_eq!(
            index
                .count(&query().with_search_type(SearchType::ExcludeRealms))
                .unwrap(),
            0
        );
    }

    #[test]
    fn empty_action_part_equals_empty_query_action() {
        let (_dir, index) = index("https://intranet.example,,Staff\n");
        let query = SearchQuery::new("intranet")
            .with_http_realm("Admins")
            .with_search_type(SearchType::ExcludeRealms);
        assert_eq!(index.count(&query).unwrap(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let index = PlaintextUrlIndex::new(dir.path().join("absent.txt"));
        assert!(matches!(
            index.count(&SearchQuery::new("")),
            Err(CoreError::Io(_))
        ));
    }
}
