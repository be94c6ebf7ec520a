//! Entry point for building queries against a configured backend.
//!
//! # Design
//! `Client` holds only the injected [`ClientConfig`] and carries no mutable
//! state between calls. Each call to [`Client::from`] hands out a fresh
//! [`QueryBuilder`]; concurrent logical requests never share builder state.

use crate::config::ClientConfig;
use crate::query::QueryBuilder;

/// Stateless handle over the backend connection settings.
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Start a query against `table`. The returned builder is consumed by
    /// `build`/`execute`; start a new one for each logical request.
    pub fn from(&self, table: &str) -> QueryBuilder<'_> {
        QueryBuilder::new(&self.config, table)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}
