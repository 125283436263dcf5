//! First-contact version gate.

use loginbridge_protocol::{Compatibility, Version};

/// Version of this server.
pub const SERVER_VERSION: Version = Version::new(0, 4);

/// Oldest client version this server accepts.
pub const MIN_CLIENT_VERSION: Version = Version::new(0, 4);

/// Decides whether a caller and this server can work together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionGate {
    server_version: Version,
    min_client_version: Version,
}

impl VersionGate {
    /// Creates a gate for a server at `server_version` accepting clients from
    /// `min_client_version` on.
    #[must_use]
    pub const fn new(server_version: Version, min_client_version: Version) -> Self {
        Self {
            server_version,
            min_client_version,
        }
    }

    /// This server's version.
    pub const fn server_version(&self) -> Version {
        self.server_version
    }

    /// The oldest accepted client version.
    pub const fn min_client_version(&self) -> Version {
        self.min_client_version
    }

    /// Checks a caller.
    ///
    /// A caller that is too old is told so even when it also rejects this
    /// server.
    pub fn check(&self, client_version: Version, min_server_version: Version) -> Compatibility {
        if self.min_client_version > client_version {
            Compatibility::ClientTooOld
        } else if min_server_version > self.server_version {
            Compatibility::ServerTooOld
        } else {
            Compatibility::Compatible
        }
    }
}

impl Default for VersionGate {
    fn default() -> Self {
        Self::new(SERVER_VERSION, MIN_CLIENT_VERSION)
    }
}
