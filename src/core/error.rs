//! Error taxonomy shared by the core operations.

use std::error::Error as _;

use serde::Serialize;
use thiserror::Error;

use crate::data::DatabaseError;

/// Errors surfaced by [`crate::core::PostoCore`] operations.
#[derive(Debug, Error)]
pub enum PostoError {
    /// Malformed structured payload coming back from storage.
    #[error("Failed to decode stored payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A partial update with every field absent.
    #[error("No fields provided for update")]
    NoFieldsProvided,

    /// Replay requested on a folder.
    #[error("Node {0} is a folder, not a request")]
    NotARequest(i64),

    #[error("Request URL is empty")]
    EmptyUrl,

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("{0} not found")]
    NotFound(String),

    /// Parent missing, in another collection, or not a folder.
    #[error("Invalid parent: {0}")]
    InvalidParent(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}

impl From<rusqlite::Error> for PostoError {
    fn from(err: rusqlite::Error) -> Self {
        PostoError::Storage(DatabaseError::Sqlite(err))
    }
}

/// Which stage of an outbound call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    /// The deadline expired before the response was fully read
    Timeout,
    /// Connection refused, DNS failure, TLS handshake
    Connect,
    /// Request could not be built or sent, or the response was malformed
    Request,
    /// Reading the response body failed
    Body,
}

impl TransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Request => "request",
            TransportErrorKind::Body => "body",
        }
    }
}

/// Network failure during replay, with the underlying cause message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Transport error ({}): {message}", .kind.as_str())]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == TransportErrorKind::Timeout
    }

    /// Classify a reqwest failure. `reading_body` marks failures after headers arrived.
    pub(crate) fn from_reqwest(err: reqwest::Error, reading_body: bool) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else if reading_body || err.is_body() || err.is_decode() {
            TransportErrorKind::Body
        } else {
            TransportErrorKind::Request
        };
        // reqwest's Display omits the root cause; walk the chain so the
        // message says "connection refused" rather than "error sending request".
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::new(kind, message)
    }
}
