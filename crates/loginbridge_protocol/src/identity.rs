//! Identity of a callback receiver.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a remote callback receiver.
///
/// Two identities are the same subscriber when both parts are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientIdentity {
    /// Object category, may be empty.
    pub category: String,
    /// Object name.
    pub name: String,
}

impl ClientIdentity {
    /// Creates an identity without a category.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            category: String::new(),
            name: name.into(),
        }
    }

    /// Creates an identity with a category.
    pub fn with_category(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.category.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.category, self.name)
        }
    }
}
