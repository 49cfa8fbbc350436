//! Tool implementations
//!
//! Built-in tools:
//! - fetch_url: GET a URL and return readable text
//! - brave_search: Web search, only when `BRAVE_API_KEY` is set
//! - read_file: Read files under the project root
//!
//! Anything else (browser automation, MCP bridges) plugs in through the
//! [`Tool`](crate::tools::registry::Tool) trait.

pub mod brave_search;
pub mod fetch_url;
pub mod read;

pub use brave_search::BraveSearchTool;
pub use fetch_url::FetchUrlTool;
pub use read::ReadTool;

use std::sync::Arc;

use crate::config::ToolSettings;
use crate::tools::registry::ToolRegistry;

/// Build the registry of built-in tools, honoring disable flags and
/// credential gating. The result is fixed for the process lifetime.
pub fn register_builtin_tools(settings: &ToolSettings, http: reqwest::Client) -> ToolRegistry {
    let mut registry = ToolRegistry::new().with_disabled(settings.disabled.iter().cloned());

    registry.register(Arc::new(FetchUrlTool::new(http.clone())));

    match &settings.brave_api_key {
        Some(key) => {
            registry.register(Arc::new(BraveSearchTool::new(http, key.clone())));
        }
        None => tracing::info!("Skipping brave_search (no BRAVE_API_KEY)"),
    }

    registry.register(Arc::new(ReadTool));

    tracing::info!(
        tools = ?registry.list_tools().iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        "Tool registry ready"
    );
    registry
}
