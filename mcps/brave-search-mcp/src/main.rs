//! Brave Search MCP Server
//!
//! Web, news, and image search through the Brave Search API.
//!
//! # Configuration
//! `BRAVE_API_KEY` is required. Optional settings live in
//! `~/.binks/brave-search.toml` (or `BRAVE_SEARCH_CONFIG_PATH`).

use brave_search_mcp::BraveSearchMcpServer;

mcp_common::serve_stdio!(BraveSearchMcpServer, "brave_search_mcp", BraveSearchMcpServer::from_env);
