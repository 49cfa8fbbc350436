//! agentchat server
//!
//! HTTP front for the agentic chat loop: `POST /api/chat` streams
//! orchestrator events as SSE. This is a library crate; the binary calls
//! `start_server()`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{http::Method, routing::get, Json, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use agentchat_core::ai::client::{AiClient, LlmProvider};
use agentchat_core::config::{AppConfig, ConfigError};
use agentchat_core::tools::implementations::register_builtin_tools;
use agentchat_core::tools::registry::{ToolContext, ToolRegistry};

pub mod error;
pub mod routes;
pub mod types;

use types::HealthResponse;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// LLM provider (None when the configured provider has no credential).
    pub provider: Option<Arc<dyn LlmProvider>>,
    /// Env var that would supply the missing credential.
    pub credential_env: &'static str,
    /// Built-in tools, fixed at startup.
    pub tool_registry: Arc<ToolRegistry>,
    pub tool_context: ToolContext,
    pub max_tool_iterations: usize,
}

impl AppState {
    /// Build the provider client and tool registry from configuration.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("agentchat/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let provider: Option<Arc<dyn LlmProvider>> = match config.provider.client_config() {
            Ok(client_config) => {
                tracing::info!(
                    provider = %config.provider.id,
                    model = %config.provider.model,
                    "LLM provider configured"
                );
                let client: Arc<dyn LlmProvider> = Arc::new(AiClient::new(client_config)?);
                Some(client)
            }
            Err(ConfigError::MissingCredential(var)) => {
                tracing::warn!(
                    "No credentials found for provider {} ({} unset); chat API will be unavailable",
                    config.provider.id,
                    var
                );
                None
            }
            Err(e) => return Err(e.into()),
        };

        let tool_registry = Arc::new(register_builtin_tools(&config.tools, http));

        Ok(Self {
            provider,
            credential_env: config.provider.id.api_key_env(),
            tool_registry,
            tool_context: ToolContext::new(config.tools.project_root.clone()),
            max_tool_iterations: config.max_tool_iterations,
        })
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .nest("/api", routes::api_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server and block until shutdown.
pub async fn start_server(config: AppConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::from_config(&config)?;
    let app = build_router(state);

    tracing::info!("agentchat server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
