//! agentchat server binary

use agentchat_core::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        provider = %config.provider.id,
        max_tool_iterations = config.max_tool_iterations,
        "Configuration loaded"
    );

    agentchat_server::start_server(config).await
}
