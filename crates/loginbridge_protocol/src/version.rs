//! Protocol versions and the compatibility verdict.

use crate::error::{ProtocolError, ProtocolResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `major.minor` protocol version.
///
/// Ordering is lexicographic on `(major, minor)`, so `0.10 > 0.9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    /// Major component.
    pub major: u16,
    /// Minor component.
    pub minor: u16,
}

impl Version {
    /// Creates a version.
    #[must_use]
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for Version {
    type Err = ProtocolError;

    /// Parses `"0.4"` or a bare `"1"` (minor defaults to zero).
    ///
    /// Each component is an integer, not a decimal fraction: `"0.40"` is minor
    /// 40 and orders after `"0.4"`, the same way `"0.10"` orders after `"0.9"`.
    fn from_str(s: &str) -> ProtocolResult<Self> {
        let s = s.trim();
        let (major, minor) = match s.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (s, "0"),
        };
        let major = major
            .parse()
            .map_err(|_| ProtocolError::invalid_value("version", s))?;
        let minor = minor
            .parse()
            .map_err(|_| ProtocolError::invalid_value("version", s))?;
        Ok(Self { major, minor })
    }
}

/// Outcome of the first-contact version check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compatibility {
    /// Both sides accept each other.
    Compatible,
    /// The caller is older than the server accepts.
    ClientTooOld,
    /// The server is older than the caller accepts.
    ServerTooOld,
}

impl Compatibility {
    /// Returns the legacy numeric result code (0, 1, -1).
    pub fn code(&self) -> i32 {
        match self {
            Compatibility::Compatible => 0,
            Compatibility::ClientTooOld => 1,
            Compatibility::ServerTooOld => -1,
        }
    }

    /// Returns true when the caller may proceed.
    pub fn is_compatible(&self) -> bool {
        matches!(self, Compatibility::Compatible)
    }
}
