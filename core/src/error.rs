//! Error types for the trip data-access client.
//!
//! # Design
//! Every request outcome — conflict, transport failure, unencodable body —
//! is reported through [`QueryError`]; nothing in the core panics on a bad
//! response. `Conflict` gets a dedicated variant because the backend uses
//! HTTP 409 to signal a unique-constraint violation and callers key their
//! duplicate-save handling off it. All other non-conflict statuses pass
//! through as data, not errors (see [`crate::response`]).

use thiserror::Error;

use crate::http::TransportError;

/// PostgreSQL error code for a unique-constraint violation. Conflict
/// responses always carry this code, whatever the server body looked like.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Message used when a conflict response body carried no usable message.
pub(crate) const GENERIC_CONFLICT_MESSAGE: &str =
    "duplicate key value violates a unique constraint";

/// Message used when the transport reported a failure without one.
pub(crate) const GENERIC_TRANSPORT_MESSAGE: &str = "network request failed";

/// Errors produced by building or executing a query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The backend rejected a write with HTTP 409.
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// The transport failed before any response arrived (DNS, timeout,
    /// connection refused).
    #[error("transport failure: {message}")]
    Transport {
        status: Option<u16>,
        code: Option<String>,
        message: String,
    },

    /// The request body could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl QueryError {
    /// Machine-readable error code, when one applies. Conflicts always
    /// report [`UNIQUE_VIOLATION`]; transport failures report whatever
    /// code the transport supplied.
    pub fn code(&self) -> Option<&str> {
        match self {
            QueryError::Conflict { .. } => Some(UNIQUE_VIOLATION),
            QueryError::Transport { code, .. } => code.as_deref(),
            QueryError::Serialization(_) => None,
        }
    }
}

impl From<TransportError> for QueryError {
    fn from(e: TransportError) -> Self {
        QueryError::Transport {
            status: e.status,
            code: e.code,
            message: e
                .message
                .unwrap_or_else(|| GENERIC_TRANSPORT_MESSAGE.to_string()),
        }
    }
}
