//! Brave Search MCP Library
//!
//! Web, news, and image search through the Brave Search API, exposed as
//! MCP tools with normalized results and a typed error set.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use brave_search_mcp::{config::{Config, Credential}, BraveSearchMcpServer};
//!
//! let server = BraveSearchMcpServer::new(Config::new(Credential::new(api_key)))?;
//! // Use with in-memory transport or serve via stdio
//! ```
//!
//! # Configuration
//! Set `BRAVE_API_KEY`, or configure `brave.api_key` in `~/.binks/brave-search.toml`

pub mod backends;
pub mod config;
pub mod error;
pub mod filters;
pub mod homepage;
pub mod server;
pub mod types;
pub mod wikidata;

// Re-export main server type
pub use server::BraveSearchMcpServer;

pub use error::AdapterError;
pub use types::{
    HomepageResult, LocalPlace, LocalResults, ResultKind, SearchKind, SearchRequest, SearchResult,
    SearchResults,
};

// Re-export parameter types for direct API usage
pub use server::{
    HomepageParams, ImageSearchParams, LocalSearchParams, NewsSearchParams, SearchParams,
};
