//! Response normalization.
//!
//! # Design
//! Every execution resolves to an [`Outcome`]: either the response body as
//! JSON data or a [`QueryError`], never both, never a panic. Only HTTP 409
//! is interpreted — the backend uses it for unique-constraint violations
//! and callers branch on it. Every other status passes its body through as
//! data, including 4xx/5xx; callers that want stricter status policing do
//! it on top of this layer.

use serde_json::Value;

use crate::error::{QueryError, GENERIC_CONFLICT_MESSAGE};
use crate::http::HttpResponse;

/// Uniform result of one executed query: the response data, or the single
/// error that replaced it.
pub type Outcome = Result<Value, QueryError>;

/// Normalize a transport-level response into an [`Outcome`].
///
/// A 409 becomes [`QueryError::Conflict`], with the message taken from the
/// body when the backend sent its structured error JSON and a generic
/// duplicate-key message otherwise. Anything else is data: JSON bodies are
/// parsed, non-JSON bodies pass through as a JSON string, empty bodies
/// become `null`.
pub fn interpret(response: HttpResponse) -> Outcome {
    if response.status == 409 {
        return Err(QueryError::Conflict {
            message: conflict_message(&response.body),
        });
    }
    if response.body.is_empty() {
        return Ok(Value::Null);
    }
    match serde_json::from_str(&response.body) {
        Ok(data) => Ok(data),
        Err(_) => Ok(Value::String(response.body)),
    }
}

/// Pull the `message` field out of a PostgREST error body, falling back to
/// a generic duplicate-key message for any other body shape.
fn conflict_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| GENERIC_CONFLICT_MESSAGE.to_string())
}
