//! # LoginBridge Core
//!
//! Core engine behind the LoginBridge credential RPC surface.
//!
//! This crate provides:
//! - The native entry model (an ordered bag of protected strings) and its key schema
//! - The field mapper between native entries and wire-format logins
//! - The match engine resolving host/action/realm queries
//! - The `EntryStore` adapter seam with in-memory and JSON file stores
//! - The plaintext URL index used when encryption is deliberately disabled
//! - The open-wait coordinator that parks callers until a database is open

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod host;
mod mapper;
mod matcher;
mod open_wait;
mod plaintext;

pub mod entry;
pub mod store;

pub use config::MemoryProtection;
pub use entry::{EntryId, EntryStrings, NativeEntry, ProtectedString};
pub use error::{CoreError, CoreResult};
pub use host::{HostTask, InlineDispatcher, NoPrompt, OpenPrompt, ReopenLastUsed, ThreadDispatcher, UiDispatcher};
pub use mapper::{display_name, FieldMapper};
pub use matcher::{normalize_url, LoginCounter, MatchEngine};
pub use open_wait::OpenWaitCoordinator;
pub use plaintext::PlaintextUrlIndex;
pub use store::{EntryStore, JsonFileStore, MemoryStore, UrlPattern};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
