//! Server initialization utilities
//!
//! Provides tracing setup and the `serve_stdio!` macro used by server
//! binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging for MCP servers
///
/// Logs go to stderr because stdout carries the MCP protocol. The filter
/// comes from `RUST_LOG`, with `info` as the default for `crate_name`.
///
/// Set `LOG_FORMAT=json` for structured JSON output (useful for log
/// aggregation). Default is human-readable text without ANSI colors.
///
/// # Example
///
/// ```rust,ignore
/// mcp_common::init_tracing("brave_search_mcp")?;
/// ```
pub fn init_tracing(crate_name: &str) -> anyhow::Result<()> {
    let directive = format!("{}=info", crate_name);
    let filter = EnvFilter::from_default_env().add_directive(directive.parse()?);

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    }

    Ok(())
}

/// Macro for MCP server `main` functions served over stdio
///
/// The constructor is fallible so a server that needs configuration can
/// refuse to start: its error is returned from `main` and the process exits
/// non-zero before the transport is opened.
///
/// # Arguments
///
/// * `$server_type` - The server struct type
/// * `$crate_name` - String literal for the crate name (used in logging)
/// * `$ctor` - Path to a `fn() -> anyhow::Result<$server_type>`
///
/// # Example
///
/// ```rust,ignore
/// use brave_search_mcp::BraveSearchMcpServer;
///
/// mcp_common::serve_stdio!(BraveSearchMcpServer, "brave_search_mcp", BraveSearchMcpServer::from_env);
/// ```
#[macro_export]
macro_rules! serve_stdio {
    ($server_type:ty, $crate_name:expr, $ctor:path) => {
        #[tokio::main]
        async fn main() -> anyhow::Result<()> {
            use rmcp::ServiceExt;

            $crate::init_tracing($crate_name)?;

            tracing::info!(concat!("Starting ", $crate_name, " MCP Server"));

            let server: $server_type = match $ctor() {
                Ok(server) => server,
                Err(e) => {
                    tracing::error!("Startup failed: {:#}", e);
                    return Err(e);
                }
            };
            let service = server.serve(rmcp::transport::stdio()).await?;

            tracing::info!("Server running, waiting for requests...");

            service.waiting().await?;

            tracing::info!("Server shutting down");
            Ok(())
        }
    };
}
