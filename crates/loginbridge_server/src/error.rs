//! Error types for the login server.

use loginbridge_core::CoreError;
use loginbridge_protocol::ProtocolError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the login server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Invalid request contents.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A frame could not be encoded or decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The core rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The server has been shut down.
    #[error("server is shut down")]
    ShutDown,
}

impl ServerError {
    /// Returns true if the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        match self {
            ServerError::InvalidRequest(_) | ServerError::Protocol(_) => true,
            ServerError::Core(e) => e.is_caller_error(),
            ServerError::ShutDown => false,
        }
    }

    /// Returns true if the server is at fault.
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classification() {
        assert!(ServerError::InvalidRequest("bad".into()).is_client_error());
        assert!(ServerError::from(CoreError::entry_not_found("00")).is_client_error());
        assert!(ServerError::from(CoreError::DatabaseClosed).is_server_error());
        assert!(ServerError::ShutDown.is_server_error());
    }

    #[test]
    fn core_errors_display_unchanged() {
        let err = ServerError::from(CoreError::entry_not_found("abcd"));
        assert_eq!(err.to_string(), "entry not found: abcd");
    }
}
