//! Result helpers for MCP tool responses

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

use crate::error::{IntoMcpError, McpResult};

/// Create a successful JSON response from any serializable data
///
/// The payload is pretty-printed into a single text content item.
///
/// # Example
///
/// ```rust,ignore
/// let results = backend.search(&request).await?;
/// json_success(&results)
/// ```
pub fn json_success<T: Serialize>(data: &T) -> McpResult<CallToolResult> {
    let json = serde_json::to_string_pretty(data).map_err(IntoMcpError::into_mcp_error)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[test]
    fn test_json_success() {
        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };
        let result = json_success(&data).unwrap();
        assert!(!result.is_error.unwrap_or(false));
        assert_eq!(result.content.len(), 1);
    }
}
