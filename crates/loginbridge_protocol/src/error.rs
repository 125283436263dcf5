//! Error types for protocol encoding.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while encoding or decoding protocol messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Message could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),

    /// Bytes could not be decoded into a message.
    #[error("decode error: {0}")]
    Decode(String),

    /// A textual value did not parse.
    #[error("invalid {what}: {value:?}")]
    InvalidValue {
        /// What was being parsed.
        what: &'static str,
        /// The offending input.
        value: String,
    },
}

impl ProtocolError {
    /// Creates an invalid value error.
    pub fn invalid_value(what: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            what,
            value: value.into(),
        }
    }
}
