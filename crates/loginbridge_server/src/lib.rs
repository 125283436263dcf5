//! # LoginBridge Server
//!
//! Transport-neutral request handling for LoginBridge.
//!
//! This crate provides:
//! - The version gate checked on first contact
//! - Handlers for every login operation, parking callers while no database is open
//! - The subscriber registry with broadcast-and-prune delivery
//! - A CBOR frame entry point for transports
//!
//! # Failure model
//!
//! Caller mistakes (a missing or unresolvable unique id, an undecodable frame)
//! come back as [`Response::Error`](loginbridge_protocol::Response::Error). A
//! database that stays closed is not an error: list operations answer with
//! the closed sentinel and counts with -1. Unreachable subscribers are pruned
//! silently during broadcast.

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod handler;
mod registry;
mod server;
mod version;

pub use config::{CountSource, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use handler::{HandlerContext, RequestHandler};
pub use registry::{BroadcastReport, DeliveryError, Subscriber, SubscriberFactory, SubscriberRegistry};
pub use server::LoginServer;
pub use version::{VersionGate, MIN_CLIENT_VERSION, SERVER_VERSION};
