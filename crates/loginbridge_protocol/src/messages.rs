//! Protocol messages.
//!
//! Every remote call is a [`Request`] answered by exactly one [`Response`].
//! Both encode to CBOR; framing on the wire is left to the transport.

use crate::credential::CredentialEntry;
use crate::error::{ProtocolError, ProtocolResult};
use crate::identity::ClientIdentity;
use crate::query::SearchQuery;
use crate::version::{Compatibility, Version};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A request from a remote caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    /// First-contact version check.
    CheckVersion {
        /// Caller's version.
        client_version: Version,
        /// Oldest server version the caller accepts.
        min_server_version: Version,
    },
    /// Name of the open database.
    GetDatabaseName,
    /// File path of the current database.
    GetDatabaseFileName,
    /// Switch the active database.
    ChangeDatabase {
        /// Database to open; `None` lets the host choose.
        path: Option<String>,
        /// Close the active database first.
        close_current: bool,
    },
    /// Register a callback receiver.
    AddClient {
        /// Receiver identity.
        identity: ClientIdentity,
    },
    /// Store a new login.
    AddLogin {
        /// The login to store.
        login: CredentialEntry,
    },
    /// Replace an existing login.
    ModifyLogin {
        /// The login as the caller last saw it; must carry a unique id.
        old_login: CredentialEntry,
        /// The replacement values.
        new_login: CredentialEntry,
    },
    /// Every stored login.
    GetAllLogins,
    /// Logins matching a query.
    FindLogins {
        /// The query.
        query: SearchQuery,
    },
    /// Number of logins matching a query.
    CountLogins {
        /// The query. Its unique id is ignored.
        query: SearchQuery,
    },
}

impl Request {
    /// Returns the message type code.
    pub fn type_code(&self) -> u8 {
        match self {
            Request::CheckVersion { .. } => 1,
            Request::GetDatabaseName => 2,
            Request::GetDatabaseFileName => 3,
            Request::ChangeDatabase { .. } => 4,
            Request::AddClient { .. } => 5,
            Request::AddLogin { .. } => 6,
            Request::ModifyLogin { .. } => 7,
            Request::GetAllLogins => 8,
            Request::FindLogins { .. } => 9,
            Request::CountLogins { .. } => 10,
        }
    }

    /// Encodes to CBOR.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        encode(self)
    }

    /// Decodes from CBOR.
    pub fn decode(bytes: &[u8]) -> ProtocolResult<Self> {
        decode(bytes)
    }
}

/// Logins returned by find/list operations.
///
/// A closed database yields `logins: None` and `count: -1`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginList {
    /// Matched logins, `None` when no database could be opened.
    pub logins: Option<Vec<CredentialEntry>>,
    /// Number of logins, or -1 when no database could be opened.
    pub count: i64,
}

impl LoginList {
    /// Wraps matched logins.
    pub fn new(logins: Vec<CredentialEntry>) -> Self {
        let count = logins.len() as i64;
        Self {
            logins: Some(logins),
            count,
        }
    }

    /// The closed-database sentinel.
    pub fn closed() -> Self {
        Self {
            logins: None,
            count: -1,
        }
    }

    /// Returns true if this is the closed-database sentinel.
    pub fn is_closed(&self) -> bool {
        self.logins.is_none()
    }

    /// Returns the logins, empty for the sentinel.
    pub fn entries(&self) -> &[CredentialEntry] {
        self.logins.as_deref().unwrap_or(&[])
    }
}

/// A response to a [`Request`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    /// Result of `CheckVersion`.
    Version(Compatibility),
    /// Result of `GetDatabaseName`.
    DatabaseName(String),
    /// Result of `GetDatabaseFileName`.
    DatabaseFileName(String),
    /// Acknowledges a request with no result.
    Done,
    /// Result of `AddLogin` / `ModifyLogin`.
    Applied {
        /// False when no database could be opened.
        applied: bool,
        /// Id of the written entry.
        unique_id: Option<String>,
    },
    /// Result of `GetAllLogins` / `FindLogins`.
    Logins(LoginList),
    /// Result of `CountLogins`; -1 when no database could be opened.
    Count(i64),
    /// The request was rejected.
    Error(String),
}

impl Response {
    /// Returns the message type code.
    pub fn type_code(&self) -> u8 {
        match self {
            Response::Version(_) => 101,
            Response::DatabaseName(_) => 102,
            Response::DatabaseFileName(_) => 103,
            Response::Done => 104,
            Response::Applied { .. } => 105,
            Response::Logins(_) => 106,
            Response::Count(_) => 107,
            Response::Error(_) => 199,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error(message.into())
    }

    /// Returns true for an error response.
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }

    /// Encodes to CBOR.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        encode(self)
    }

    /// Decodes from CBOR.
    pub fn decode(bytes: &[u8]) -> ProtocolResult<Self> {
        decode(bytes)
    }
}

fn encode<T: Serialize>(value: &T) -> ProtocolResult<Vec<u8>> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes).map_err(|e| ProtocolError::Encode(e.to_string()))?;
    Ok(bytes)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> ProtocolResult<T> {
    ciborium::from_reader(bytes).map_err(|e| ProtocolError::Decode(e.to_string()))
}
