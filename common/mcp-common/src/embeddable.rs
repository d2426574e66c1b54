//! Embeddable MCP trait for in-process execution
//!
//! This module provides the [`EmbeddableMcp`] trait that allows MCP servers
//! to be executed directly in-process without subprocess spawning or IPC.
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_common::EmbeddableMcp;
//! use brave_search_mcp::BraveSearchMcpServer;
//!
//! let server = BraveSearchMcpServer::from_env()?;
//!
//! // List available tools
//! let tools = server.list_tools();
//! println!("Available: {:?}", tools.iter().map(|t| &t.name).collect::<Vec<_>>());
//!
//! // Call a tool directly
//! let result = server
//!     .call_tool("search", serde_json::json!({"query": "rust ownership", "count": 5}))
//!     .await?;
//! ```

use async_trait::async_trait;
use rmcp::model::{CallToolResult, Tool};
use serde_json::Value;

/// Error type for embeddable MCP operations
#[derive(Debug, thiserror::Error)]
pub enum EmbeddableError {
    /// Tool was not found in the server
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// Invalid parameters passed to the tool
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// The tool ran and failed; the full MCP error, including its code and
    /// structured `data`, is kept
    #[error("mcp error: {}", .0.message)]
    McpError(rmcp::ErrorData),
}

impl From<rmcp::ErrorData> for EmbeddableError {
    fn from(err: rmcp::ErrorData) -> Self {
        EmbeddableError::McpError(err)
    }
}

impl EmbeddableError {
    /// Structured detail of a failed tool call, if the tool attached any
    pub fn data(&self) -> Option<&Value> {
        match self {
            EmbeddableError::McpError(err) => err.data.as_ref(),
            _ => None,
        }
    }
}

/// Result type for embeddable MCP operations
pub type EmbeddableResult<T> = Result<T, EmbeddableError>;

/// Trait for MCP servers that can be executed in-process
///
/// This trait enables direct execution of MCP servers without subprocess
/// spawning or IPC. Servers implementing this trait can be embedded directly
/// into a host application for lower latency and tighter integration.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to support concurrent tool calls
/// from multiple async tasks.
///
/// # Implementation
///
/// The trait is designed to work with rmcp's `ToolRouter<Self>` pattern.
/// Servers that use `#[tool_router]` can implement this trait by delegating
/// to their internal router.
///
/// ```rust,ignore
/// #[async_trait]
/// impl EmbeddableMcp for BraveSearchMcpServer {
///     fn server_name(&self) -> &str {
///         "brave-search"
///     }
///
///     fn list_tools(&self) -> Vec<Tool> {
///         self.tool_router.list_all()
///     }
///
///     async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
///         match name {
///             "search" => self.search(Parameters(serde_json::from_value(params)?)).await,
///             _ => return Err(EmbeddableError::ToolNotFound(name.to_string())),
///         }
///         .map_err(EmbeddableError::from)
///     }
/// }
/// ```
#[async_trait]
pub trait EmbeddableMcp: Send + Sync {
    /// Returns the server name for identification
    ///
    /// This should match the server name used in MCP configuration files.
    fn server_name(&self) -> &str;

    /// Returns a list of all available tools
    ///
    /// Each tool includes its name, description, and input schema.
    fn list_tools(&self) -> Vec<Tool>;

    /// Executes a tool by name with the given parameters
    ///
    /// # Arguments
    ///
    /// * `name` - The tool name as returned by `list_tools`
    /// * `params` - JSON object containing the tool parameters
    ///
    /// # Returns
    ///
    /// Returns the tool result on success, or an error if:
    /// - The tool is not found
    /// - The parameters are invalid
    /// - Tool execution fails
    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult>;

    /// Returns an optional description of the server
    ///
    /// This is used for documentation and discovery purposes.
    fn server_description(&self) -> Option<&str> {
        None
    }

    /// Returns the server version, if available
    fn server_version(&self) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestServer;

    #[async_trait]
    impl EmbeddableMcp for TestServer {
        fn server_name(&self) -> &str {
            "test-server"
        }

        fn list_tools(&self) -> Vec<Tool> {
            vec![]
        }

        async fn call_tool(&self, name: &str, _params: Value) -> EmbeddableResult<CallToolResult> {
            Err(EmbeddableError::ToolNotFound(name.to_string()))
        }
    }

    #[test]
    fn test_server_name() {
        let server = TestServer;
        assert_eq!(server.server_name(), "test-server");
    }

    #[test]
    fn test_list_tools_empty() {
        let server = TestServer;
        assert!(server.list_tools().is_empty());
    }

    #[test]
    fn test_mcp_error_keeps_code_and_data() {
        let err: EmbeddableError = rmcp::ErrorData::invalid_params(
            "query must not be empty",
            Some(serde_json::json!({"kind": "invalid_request"})),
        )
        .into();
        assert_eq!(err.to_string(), "mcp error: query must not be empty");
        assert_eq!(err.data().unwrap()["kind"], "invalid_request");
        match err {
            EmbeddableError::McpError(inner) => {
                assert_eq!(inner.code, rmcp::model::ErrorCode::INVALID_PARAMS)
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_other_errors_have_no_data() {
        assert!(EmbeddableError::ToolNotFound("x".to_string()).data().is_none());
    }

    #[tokio::test]
    async fn test_call_unknown_tool() {
        let server = TestServer;
        let result = server.call_tool("unknown", serde_json::json!({})).await;
        assert!(matches!(result, Err(EmbeddableError::ToolNotFound(_))));
    }
}
