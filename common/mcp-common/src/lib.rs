//! MCP Common - Shared plumbing for MCP servers
//!
//! - **Initialization**: `serve_stdio!` macro and [`init_tracing`]
//! - **Results**: [`json_success`] for structured tool output
//! - **Errors**: [`IntoMcpError`] and [`structured_error`] for typed failures
//! - **Embeddable**: [`EmbeddableMcp`] trait for in-process execution
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_common::{serve_stdio, json_success};
//!
//! // In main.rs
//! serve_stdio!(MyServer, "my_mcp", MyServer::from_env);
//!
//! // In tool implementations
//! fn my_tool(&self) -> Result<CallToolResult, McpError> {
//!     json_success(&self.lookup()?)
//! }
//! ```

pub mod embeddable;
pub mod error;
pub mod init;
pub mod result;

// Re-export commonly used items at crate root
pub use embeddable::{EmbeddableError, EmbeddableMcp, EmbeddableResult};
pub use error::{structured_error, IntoMcpError, McpResult};
pub use init::init_tracing;
pub use result::json_success;

// Re-export rmcp types that are commonly needed
pub use rmcp::ErrorData as McpError;

// Re-export async_trait for implementing EmbeddableMcp
pub use async_trait::async_trait;
