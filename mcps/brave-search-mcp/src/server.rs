//! MCP Server implementation for Brave search
//!
//! This module defines the main MCP server that exposes web, news, and
//! image search plus the official-homepage lookup as tools.

use std::collections::BTreeMap;
use std::sync::Arc;

use mcp_common::{
    async_trait, json_success, EmbeddableError, EmbeddableMcp, EmbeddableResult, IntoMcpError,
    McpError,
};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, ServerCapabilities, ServerInfo, Tool},
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backends::{brave::BraveBackend, http_client, SearchBackend};
use crate::config::Config;
use crate::error::AdapterError;
use crate::filters::FILTERS;
use crate::homepage::HomepageFinder;
use crate::types::{LocalResults, SearchKind, SearchRequest, SearchResults};
use crate::wikidata::WikidataClient;

/// The main Brave Search MCP Server
#[derive(Clone)]
pub struct BraveSearchMcpServer {
    backend: Arc<dyn SearchBackend>,
    homepage: HomepageFinder,
    config: Config,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Parameter Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// The search query
    #[schemars(description = "The search query string (max 400 characters)")]
    pub query: String,
    /// Maximum number of results to return
    #[schemars(description = "Maximum number of results to return (default: 10, max: 20)")]
    pub count: Option<u32>,
    #[schemars(
        description = "Optional filters: freshness (pd|pw|pm|py|YYYY-MM-DDtoYYYY-MM-DD), country, search_lang, ui_lang, safesearch, offset (0-9), spellcheck"
    )]
    pub filters: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct NewsSearchParams {
    /// The search query
    #[schemars(description = "The news search query string")]
    pub query: String,
    /// Maximum number of results to return
    #[schemars(description = "Maximum number of results to return (default: 10, max: 50)")]
    pub count: Option<u32>,
    #[schemars(
        description = "Optional filters: freshness, country, search_lang, ui_lang, safesearch, offset, spellcheck"
    )]
    pub filters: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ImageSearchParams {
    /// The search query
    #[schemars(description = "The image search query string")]
    pub query: String,
    /// Maximum number of results to return
    #[schemars(description = "Maximum number of results to return (default: 10, max: 100)")]
    pub count: Option<u32>,
    #[schemars(description = "Optional filters: country, search_lang, safesearch (off|strict), spellcheck")]
    pub filters: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LocalSearchParams {
    #[schemars(description = "What and where, e.g. \"pizza near Zurich HB\"")]
    pub query: String,
    #[schemars(description = "Maximum number of places to return (default: 10, max: 20)")]
    pub count: Option<u32>,
    #[schemars(description = "Optional filters, as for web search")]
    pub filters: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct HomepageParams {
    #[schemars(description = "Company name, e.g. \"Novartis\"")]
    pub company: String,
    #[schemars(description = "How many search results to consider (default: 10, max: 20)")]
    pub count: Option<u32>,
}

// ============================================================================
// Tool Router Implementation
// ============================================================================

#[tool_router]
impl BraveSearchMcpServer {
    /// Create a server talking to Brave (and Wikidata, if enabled)
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = http_client(&config.brave)?;
        let backend: Arc<dyn SearchBackend> = Arc::new(BraveBackend::new(client.clone(), &config.brave)?);
        tracing::info!("Using Brave backend at {}", config.brave.base_url);

        let wikidata = config
            .wikidata
            .enabled
            .then(|| WikidataClient::new(client, config.wikidata.url.clone()));

        Ok(Self::with_backend(config, backend, wikidata))
    }

    /// Create a server from the process environment and config file
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Config::load()?;
        Self::new(config)
    }

    /// Create a server over an explicit backend
    pub fn with_backend(
        config: Config,
        backend: Arc<dyn SearchBackend>,
        wikidata: Option<WikidataClient>,
    ) -> Self {
        if !backend.is_available() {
            tracing::warn!("Backend '{}' is not available", backend.name());
        }

        let homepage = HomepageFinder::new(
            backend.clone(),
            wikidata,
            config.homepage.excluded_domains.clone(),
            config.search.default_count,
        );

        Self {
            backend,
            homepage,
            config,
            tool_router: Self::tool_router(),
        }
    }

    /// Validate and run one search through the backend
    pub async fn run_search(
        &self,
        kind: SearchKind,
        query: &str,
        count: Option<u32>,
        filters: Option<&BTreeMap<String, Value>>,
    ) -> Result<SearchResults, AdapterError> {
        let request = SearchRequest::new(kind, query, count, self.config.search.default_count, filters)
            .inspect_err(|e| tracing::info!(kind = %kind, error = %e, "rejected search request"))?;

        tracing::info!(
            "Searching {} for: {} (count: {})",
            kind,
            request.query(),
            request.count()
        );

        self.backend.search(&request).await
    }

    /// Look up places for a query, falling back to web results when the
    /// provider knows none
    pub async fn run_local_search(
        &self,
        query: &str,
        count: Option<u32>,
        filters: Option<&BTreeMap<String, Value>>,
    ) -> Result<LocalResults, AdapterError> {
        let request =
            SearchRequest::new(SearchKind::Web, query, count, self.config.search.default_count, filters)
                .inspect_err(|e| tracing::info!(error = %e, "rejected local search request"))?;

        tracing::info!("Local search for: {} (count: {})", request.query(), request.count());

        let places = self.backend.search_local(&request).await?;
        if !places.is_empty() {
            return Ok(LocalResults {
                query: request.query().to_string(),
                places,
                web_fallback: None,
            });
        }

        tracing::info!("No places found, falling back to web search");
        let web = self.backend.search(&request).await?;
        Ok(LocalResults {
            query: request.query().to_string(),
            places: Vec::new(),
            web_fallback: Some(web),
        })
    }

    // ========================================================================
    // Search Tools
    // ========================================================================

    #[tool(description = "Search the web with Brave. Returns titles, URLs, and snippets in ranking order.")]
    async fn search(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let results = self
            .run_search(SearchKind::Web, &params.query, params.count, params.filters.as_ref())
            .await
            .map_err(IntoMcpError::into_mcp_error)?;
        json_success(&results)
    }

    #[tool(description = "Search for news articles with Brave. Returns titles, URLs, sources, and ages.")]
    async fn search_news(
        &self,
        Parameters(params): Parameters<NewsSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let results = self
            .run_search(SearchKind::News, &params.query, params.count, params.filters.as_ref())
            .await
            .map_err(IntoMcpError::into_mcp_error)?;
        json_success(&results)
    }

    #[tool(description = "Search for images with Brave. Returns image URLs, page URLs, and thumbnails.")]
    async fn search_images(
        &self,
        Parameters(params): Parameters<ImageSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let results = self
            .run_search(SearchKind::Image, &params.query, params.count, params.filters.as_ref())
            .await
            .map_err(IntoMcpError::into_mcp_error)?;
        json_success(&results)
    }

    #[tool(
        description = "Search for local businesses and places with Brave. Returns names, addresses, phone numbers, ratings, price ranges, opening hours, and descriptions; falls back to web results when no places match."
    )]
    async fn search_local(
        &self,
        Parameters(params): Parameters<LocalSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let results = self
            .run_local_search(&params.query, params.count, params.filters.as_ref())
            .await
            .map_err(IntoMcpError::into_mcp_error)?;
        json_success(&results)
    }

    #[tool(description = "Find a company's official website from Brave results, falling back to Wikidata.")]
    async fn find_official_homepage(
        &self,
        Parameters(params): Parameters<HomepageParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Looking up official homepage for: {}", params.company);

        let result = self
            .homepage
            .find(&params.company, params.count)
            .await
            .map_err(IntoMcpError::into_mcp_error)?;
        json_success(&result)
    }

    #[tool(description = "Get the current search backend configuration and status.")]
    async fn get_config(&self) -> Result<CallToolResult, McpError> {
        #[derive(Serialize)]
        struct FilterInfo {
            name: &'static str,
            kinds: Vec<&'static str>,
            values: &'static str,
        }

        #[derive(Serialize)]
        struct ConfigStatus {
            backend: String,
            available: bool,
            base_url: String,
            timeout_ms: u64,
            default_count: u32,
            max_count: BTreeMap<&'static str, u32>,
            filters: Vec<FilterInfo>,
            wikidata_fallback: bool,
        }

        let status = ConfigStatus {
            backend: self.backend.name().to_string(),
            available: self.backend.is_available(),
            base_url: self.config.brave.base_url.clone(),
            timeout_ms: self.config.brave.timeout.as_millis() as u64,
            default_count: self.config.search.default_count,
            max_count: [SearchKind::Web, SearchKind::News, SearchKind::Image]
                .into_iter()
                .map(|k| (k.as_str(), k.max_count()))
                .collect(),
            filters: FILTERS
                .iter()
                .map(|f| FilterInfo {
                    name: f.name,
                    kinds: f.kinds.iter().map(|k| k.as_str()).collect(),
                    values: f.description,
                })
                .collect(),
            wikidata_fallback: self.config.wikidata.enabled,
        };

        json_success(&status)
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl rmcp::ServerHandler for BraveSearchMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Brave Search MCP Server - provides tools for searching the web, news, \
                 images, and local places through the Brave Search API, plus an \
                 official-homepage lookup. Errors carry a 'kind' (invalid_request, authentication_failed, \
                 rate_limited, upstream_unavailable, malformed_upstream_response) and \
                 whether the call can be retried."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// ============================================================================
// Embeddable Implementation
// ============================================================================

#[async_trait]
impl EmbeddableMcp for BraveSearchMcpServer {
    fn server_name(&self) -> &str {
        "brave-search"
    }

    fn server_description(&self) -> Option<&str> {
        Some("Web, news, image, and local search through the Brave Search API.")
    }

    fn server_version(&self) -> Option<&str> {
        Some(env!("CARGO_PKG_VERSION"))
    }

    fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
        match name {
            "search" => {
                let params: SearchParams = parse_params(params)?;
                self.search(Parameters(params)).await.map_err(Into::into)
            }

            "search_news" => {
                let params: NewsSearchParams = parse_params(params)?;
                self.search_news(Parameters(params)).await.map_err(Into::into)
            }

            "search_images" => {
                let params: ImageSearchParams = parse_params(params)?;
                self.search_images(Parameters(params)).await.map_err(Into::into)
            }

            "search_local" => {
                let params: LocalSearchParams = parse_params(params)?;
                self.search_local(Parameters(params)).await.map_err(Into::into)
            }

            "find_official_homepage" => {
                let params: HomepageParams = parse_params(params)?;
                self.find_official_homepage(Parameters(params))
                    .await
                    .map_err(Into::into)
            }

            "get_config" => self.get_config().await.map_err(Into::into),

            _ => Err(EmbeddableError::ToolNotFound(name.to_string())),
        }
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Value) -> EmbeddableResult<T> {
    serde_json::from_value(params).map_err(|e| EmbeddableError::InvalidParams(e.to_string()))
}
