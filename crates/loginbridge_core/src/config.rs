//! Store protection policy.

use serde::{Deserialize, Serialize};

/// Which well-known entry attributes the store keeps protected in memory.
///
/// The core only sets the flag on each written value; what protection means
/// is up to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryProtection {
    /// Protect the title.
    pub protect_title: bool,
    /// Protect the user name.
    pub protect_user_name: bool,
    /// Protect the password.
    pub protect_password: bool,
    /// Protect URL, form match URL and HTTP realm.
    pub protect_url: bool,
}

impl Default for MemoryProtection {
    fn default() -> Self {
        Self {
            protect_title: false,
            protect_user_name: false,
            protect_password: true,
            protect_url: false,
        }
    }
}

impl MemoryProtection {
    /// Creates the default policy (password only).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets title protection.
    #[must_use]
    pub const fn protect_title(mut self, value: bool) -> Self {
        self.protect_title = value;
        self
    }

    /// Sets user name protection.
    #[must_use]
    pub const fn protect_user_name(mut self, value: bool) -> Self {
        self.protect_user_name = value;
        self
    }

    /// Sets password protection.
    #[must_use]
    pub const fn protect_password(mut self, value: bool) -> Self {
        self.protect_password = value;
        self
    }

    /// Sets URL protection.
    #[must_use]
    pub const fn protect_url(mut self, value: bool) -> Self {
        self.protect_url = value;
        self
    }
}
