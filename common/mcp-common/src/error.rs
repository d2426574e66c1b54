//! Error handling utilities for MCP servers
//!
//! Servers keep their own typed errors and convert them at the tool
//! boundary through [`IntoMcpError`].

use rmcp::ErrorData as McpError;
use serde_json::Value;

/// Type alias for MCP tool results
pub type McpResult<T> = Result<T, McpError>;

/// Trait for converting errors into MCP-compatible errors
///
/// Implement this for a server's domain error so tool methods can
/// `map_err(IntoMcpError::into_mcp_error)`.
///
/// # Example
///
/// ```rust,ignore
/// impl IntoMcpError for AdapterError {
///     fn into_mcp_error(self) -> McpError {
///         structured_error(self.is_caller_fault(), self.to_string(), json!({"kind": self.kind()}))
///     }
/// }
/// ```
pub trait IntoMcpError {
    /// Convert this error into an MCP error
    fn into_mcp_error(self) -> McpError;
}

impl IntoMcpError for serde_json::Error {
    fn into_mcp_error(self) -> McpError {
        McpError::internal_error(format!("JSON error: {}", self), None)
    }
}

/// Build an MCP error that carries machine-readable detail
///
/// `caller_fault` selects the invalid-params code; everything else is an
/// internal error. `data` travels in the JSON-RPC error's `data` member so
/// clients can branch on it without parsing `message`.
pub fn structured_error(caller_fault: bool, message: impl Into<String>, data: Value) -> McpError {
    let message = message.into();
    if caller_fault {
        McpError::invalid_params(message, Some(data))
    } else {
        McpError::internal_error(message, Some(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;
    use serde_json::json;

    #[test]
    fn test_structured_error_caller_fault() {
        let err = structured_error(true, "bad param", json!({"kind": "invalid_request"}));
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("bad param"));
        assert_eq!(err.data.unwrap()["kind"], "invalid_request");
    }

    #[test]
    fn test_structured_error_internal() {
        let err = structured_error(false, "upstream down", json!({"retryable": true}));
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
        assert_eq!(err.data.unwrap()["retryable"], true);
    }

    #[test]
    fn test_serde_json_error() {
        let parse: Result<Value, _> = serde_json::from_str("{");
        let err = parse.unwrap_err().into_mcp_error();
        assert!(err.message.starts_with("JSON error"));
    }
}
