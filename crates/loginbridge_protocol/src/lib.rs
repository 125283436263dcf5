//! # LoginBridge Protocol
//!
//! Wire types and CBOR codecs for the LoginBridge credential RPC surface.
//!
//! This crate provides:
//! - `CredentialEntry` and `FormField`, the login record exchanged with remote callers
//! - `SearchQuery` for find/count requests
//! - `Version` and `Compatibility` for the first-contact version check
//! - `ClientIdentity` for callback registration
//! - Request/response messages with CBOR encoding
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod credential;
mod error;
mod identity;
mod messages;
mod query;
mod version;

pub use credential::{CredentialEntry, FormField, FormFieldType};
pub use error::{ProtocolError, ProtocolResult};
pub use identity::ClientIdentity;
pub use messages::{LoginList, Request, Response};
pub use query::{SearchQuery, SearchType};
pub use version::{Compatibility, Version};
