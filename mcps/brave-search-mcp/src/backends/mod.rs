//! Search backend implementations
//!
//! This module provides a trait-based abstraction for search backends.
//! The server only talks to [`SearchBackend`], so tests can substitute a
//! fake provider. Brave is the production implementation.

use async_trait::async_trait;
use reqwest::Client;

use crate::config::{BraveConfig, ConfigError};
use crate::error::AdapterError;
use crate::types::{LocalPlace, SearchRequest, SearchResults};

pub mod brave;
pub mod local;

/// Trait for search backends
///
/// Implementations hold no per-call mutable state, so one instance serves
/// concurrent invocations.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Get the name of this backend
    fn name(&self) -> &str;

    /// Run one search
    ///
    /// Performs exactly one upstream call and no retries. Either every
    /// result is normalized or an error is returned.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResults, AdapterError>;

    /// Look up places matching a web request
    ///
    /// An empty list means the provider has no places for the query.
    async fn search_local(&self, request: &SearchRequest) -> Result<Vec<LocalPlace>, AdapterError>;

    /// Check if this backend is configured and available
    fn is_available(&self) -> bool;
}

/// Build the HTTP client shared by the provider and fallback lookups
pub fn http_client(config: &BraveConfig) -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.timeout)
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}
