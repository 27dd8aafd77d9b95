//! Sitehooks issue bot.
//!
//! Receives signed issue events and posts a greeting comment on every newly
//! opened issue.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sitehooks::web::shutdown_signal;
use sitehooks::{issue_bot_router, GitHubClient, IssueBotConfig, IssueBotState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("issue_bot_starting");

    let config = IssueBotConfig::from_env()
        .inspect_err(|e| error!(error = %e, "config_invalid"))
        .context("Failed to load configuration")?;
    info!(
        port = config.port,
        github_api_url = %config.github_api_url,
        require_signature = config.signature_policy.require_signature,
        "config_loaded"
    );

    let client = GitHubClient::new(
        &config.github_api_url,
        &config.github_token,
        Duration::from_millis(config.http_timeout_ms),
    )
    .context("Failed to build issues API client")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = IssueBotState::new(config, Arc::new(client));
    let app = issue_bot_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "issue_bot_listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("issue_bot_shutdown_complete");

    Ok(())
}
