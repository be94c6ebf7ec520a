//! Domain DTOs for the trip-planning tables.
//!
//! # Design
//! These types mirror the backend's `plans` table but are defined
//! independently of any server code; the mock server keeps its own schema
//! and integration tests catch drift between the two. Dates travel as ISO
//! `YYYY-MM-DD` strings — the backend treats them as opaque sortable text
//! and nothing in the client does date arithmetic.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved travel plan, as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Plan {
    pub id: Uuid,
    pub destination: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Payload for creating a plan. The backend assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlan {
    pub destination: String,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewPlan {
    pub fn new(destination: &str, start_date: &str) -> Self {
        Self {
            destination: destination.to_string(),
            start_date: start_date.to_string(),
            end_date: None,
            status: default_status(),
            notes: None,
        }
    }
}

fn default_status() -> String {
    "planned".to_string()
}

/// Partial update for a plan. Only the fields present in the JSON are
/// applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
