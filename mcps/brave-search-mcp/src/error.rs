//! Error types for search operations
//!
//! [`AdapterError`] is the closed set of failures a search call can end in.
//! Every variant has a stable kind tag so callers can decide whether to retry
//! without parsing messages.

use std::time::Duration;

use mcp_common::{structured_error, IntoMcpError, McpError};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::json;
use thiserror::Error;

/// Errors returned by a search backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// The request was rejected before (or by) the provider as invalid
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The provider rejected the credential
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The provider's quota was exceeded
    #[error("rate limited: {message}")]
    RateLimited {
        message: String,
        /// Delay the provider asked for, if it sent one
        retry_after: Option<Duration>,
    },

    /// Network failure, timeout, or a 5xx from the provider
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The provider answered with a body that does not match its schema
    #[error("malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),
}

impl AdapterError {
    /// Stable tag for this error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::AuthenticationFailed(_) => "authentication_failed",
            Self::RateLimited { .. } => "rate_limited",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
            Self::MalformedUpstreamResponse(_) => "malformed_upstream_response",
        }
    }

    /// Whether repeating the same call later can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::UpstreamUnavailable(_)
        )
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Map a non-success HTTP response to an error
    ///
    /// `body` is only used to enrich the message; it is truncated so a
    /// provider error page does not flood the caller.
    pub fn from_status(status: StatusCode, headers: &HeaderMap, body: &str) -> Self {
        let detail = summarize_body(body);
        match status.as_u16() {
            401 | 403 => Self::AuthenticationFailed(format!(
                "provider returned HTTP {} (check the API key){}",
                status.as_u16(),
                detail
            )),
            429 => Self::RateLimited {
                message: format!("provider returned HTTP 429{}", detail),
                retry_after: parse_retry_after(headers),
            },
            400 | 422 => Self::InvalidRequest(format!(
                "provider rejected the request with HTTP {}{}",
                status.as_u16(),
                detail
            )),
            _ => Self::UpstreamUnavailable(format!(
                "provider returned HTTP {}{}",
                status.as_u16(),
                detail
            )),
        }
    }

    /// Map a transport-level failure to an error
    pub fn from_transport(err: reqwest::Error) -> Self {
        // The URL carries the caller's query and adds nothing to the message
        let err = err.without_url();
        if err.is_timeout() {
            Self::UpstreamUnavailable(format!("request timed out: {}", err))
        } else if err.is_connect() {
            Self::UpstreamUnavailable(format!("connection failed: {}", err))
        } else if err.is_decode() || err.is_body() {
            Self::MalformedUpstreamResponse(format!("unreadable response body: {}", err))
        } else {
            Self::UpstreamUnavailable(err.to_string())
        }
    }
}

fn summarize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let cut: String = trimmed.chars().take(200).collect();
    format!(": {}", cut)
}

/// Read the provider's requested delay from a 429 response
///
/// `Retry-After` may be delta-seconds or an HTTP date. Brave also sends
/// `X-RateLimit-Reset` as a comma-separated list of seconds per window; the
/// first entry is the shortest window.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    if let Some(value) = headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
    {
        let value = value.trim();
        if let Ok(secs) = value.parse::<u64>() {
            return Some(Duration::from_secs(secs));
        }
        if let Ok(date) = chrono::DateTime::parse_from_rfc2822(value) {
            let delta = date.with_timezone(&chrono::Utc) - chrono::Utc::now();
            return Some(delta.to_std().unwrap_or(Duration::ZERO));
        }
    }

    headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

impl IntoMcpError for AdapterError {
    fn into_mcp_error(self) -> McpError {
        let data = json!({
            "kind": self.kind(),
            "retryable": self.is_retryable(),
            "retry_after_secs": self.retry_after().map(|d| d.as_secs()),
        });
        let invalid = matches!(self, Self::InvalidRequest(_));
        structured_error(invalid, self.to_string(), data)
    }
}

impl From<AdapterError> for McpError {
    fn from(e: AdapterError) -> Self {
        e.into_mcp_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_status_mapping() {
        let headers = HeaderMap::new();
        assert!(matches!(
            AdapterError::from_status(StatusCode::UNAUTHORIZED, &headers, ""),
            AdapterError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            AdapterError::from_status(StatusCode::FORBIDDEN, &headers, ""),
            AdapterError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            AdapterError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &headers, "boom"),
            AdapterError::UpstreamUnavailable(_)
        ));
        assert!(matches!(
            AdapterError::from_status(StatusCode::BAD_GATEWAY, &headers, ""),
            AdapterError::UpstreamUnavailable(_)
        ));
        assert!(matches!(
            AdapterError::from_status(StatusCode::UNPROCESSABLE_ENTITY, &headers, ""),
            AdapterError::InvalidRequest(_)
        ));
    }

    #[test]
    fn test_retry_after_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("7"));
        let err = AdapterError::from_status(StatusCode::TOO_MANY_REQUESTS, &headers, "");
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
        assert!(err.is_retryable());
        assert_eq!(err.kind(), "rate_limited");
    }

    #[test]
    fn test_retry_after_falls_back_to_ratelimit_reset() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1, 1419704"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_retry_after_past_http_date_is_zero() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "retry-after",
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(parse_retry_after(&headers), Some(Duration::ZERO));
    }

    #[test]
    fn test_retry_after_absent() {
        let headers = HeaderMap::new();
        let err = AdapterError::from_status(StatusCode::TOO_MANY_REQUESTS, &headers, "");
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_body_is_truncated() {
        let body = "x".repeat(1000);
        let err = AdapterError::from_status(StatusCode::SERVICE_UNAVAILABLE, &HeaderMap::new(), &body);
        assert!(err.to_string().len() < 300);
    }

    #[test]
    fn test_mcp_error_carries_kind() {
        let err: McpError = AdapterError::RateLimited {
            message: "slow down".to_string(),
            retry_after: Some(Duration::from_secs(3)),
        }
        .into();
        let data = err.data.expect("structured data");
        assert_eq!(data["kind"], "rate_limited");
        assert_eq!(data["retryable"], true);
        assert_eq!(data["retry_after_secs"], 3);
    }

    #[test]
    fn test_invalid_request_uses_invalid_params_code() {
        let err: McpError = AdapterError::invalid("query is empty").into();
        assert_eq!(err.code, rmcp::model::ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("query is empty"));
    }
}
