//! # LoginBridge Testkit
//!
//! Test utilities for LoginBridge.
//!
//! This crate provides:
//! - Sample logins, vault fixtures and server builders
//! - Recording and failing callback receivers
//! - Property-based test generators using proptest
//! - Concurrency stress helpers for the open-wait path
//!
//! ## Usage
//!
//! ```rust,ignore
//! use loginbridge_testkit::prelude::*;
//!
//! #[test]
//! fn finds_sample_login() {
//!     let server = TestServer::open(sample_entries());
//!     let list = server.handler().find_logins(&SearchQuery::new("https://example.com")).unwrap();
//!     assert!(!list.entries().is_empty());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
