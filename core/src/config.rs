//! Backend connection settings.
//!
//! # Design
//! The base URL and credentials are injected configuration, not process-wide
//! constants, so tests and deployments can point the same client at a mock
//! server, a staging project, or production. `Deserialize` is derived so a
//! deployment can load the struct straight from a JSON or TOML file.

use serde::Deserialize;

/// Connection settings for a PostgREST-style backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Backend origin, e.g. `https://myproject.supabase.co`.
    pub base_url: String,
    /// Value of the `apikey` header.
    pub api_key: String,
    /// Token sent as `Authorization: Bearer <token>`.
    pub bearer_token: String,
    /// Optional proxy base prefixed to the request URL when a query opts
    /// into proxying with [`QueryBuilder::via_proxy`](crate::QueryBuilder::via_proxy).
    #[serde(default)]
    pub proxy_url: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: &str, api_key: &str, bearer_token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bearer_token: bearer_token.to_string(),
            proxy_url: None,
        }
    }

    pub fn with_proxy(mut self, proxy_url: &str) -> Self {
        self.proxy_url = Some(proxy_url.to_string());
        self
    }
}
