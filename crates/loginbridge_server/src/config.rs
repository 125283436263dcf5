//! Server configuration.

use crate::version::{MIN_CLIENT_VERSION, SERVER_VERSION};
use loginbridge_protocol::Version;
use std::path::PathBuf;
use std::time::Duration;

/// Where `CountLogins` gets its answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CountSource {
    /// Match against the open database.
    #[default]
    Store,
    /// Read a plaintext URL index; the database need not be open.
    Plaintext(PathBuf),
}

/// Configuration for the login server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Version reported to callers.
    pub server_version: Version,
    /// Oldest client version accepted.
    pub min_client_version: Version,
    /// How long an operation waits for a database to be opened. `None` waits
    /// indefinitely.
    pub open_wait_timeout: Option<Duration>,
    /// Backing source for login counts.
    pub count_source: CountSource,
}

impl ServerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            server_version: SERVER_VERSION,
            min_client_version: MIN_CLIENT_VERSION,
            open_wait_timeout: None,
            count_source: CountSource::Store,
        }
    }

    /// Sets the reported server version.
    #[must_use]
    pub fn with_server_version(mut self, version: Version) -> Self {
        self.server_version = version;
        self
    }

    /// Sets the oldest accepted client version.
    #[must_use]
    pub fn with_min_client_version(mut self, version: Version) -> Self {
        self.min_client_version = version;
        self
    }

    /// Bounds how long an operation waits for a database.
    #[must_use]
    pub fn with_open_wait_timeout(mut self, timeout: Duration) -> Self {
        self.open_wait_timeout = Some(timeout);
        self
    }

    /// Counts logins from a plaintext URL index at `path`.
    #[must_use]
    pub fn with_plaintext_index(mut self, path: impl Into<PathBuf>) -> Self {
        self.count_source = CountSource::Plaintext(path.into());
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.server_version, Version::new(0, 4));
        assert_eq!(config.min_client_version, Version::new(0, 4));
        assert!(config.open_wait_timeout.is_none());
        assert_eq!(config.count_source, CountSource::Store);
    }

    #[test]
    fn config_builder() {
        let config = ServerConfig::new()
            .with_server_version(Version::new(1, 0))
            .with_min_client_version(Version::new(0, 9))
            .with_open_wait_timeout(Duration::from_secs(30))
            .with_plaintext_index("/tmp/urls.txt");

        assert_eq!(config.server_version, Version::new(1, 0));
        assert_eq!(config.min_client_version, Version::new(0, 9));
        assert_eq!(config.open_wait_timeout, Some(Duration::from_secs(30)));
        assert_eq!(
            config.count_source,
            CountSource::Plaintext(PathBuf::from("/tmp/urls.txt"))
        );
    }
}
