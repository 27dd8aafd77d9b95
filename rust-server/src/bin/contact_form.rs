//! Sitehooks contact form.
//!
//! Serves the form page, validates submissions, optionally stores them, sends
//! a notification email and redirects the browser.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sitehooks::web::shutdown_signal;
use sitehooks::{
    contact_form_router, AppwriteStore, ContactFormConfig, ContactFormState, SmtpNotifier,
    SubmissionStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("contact_form_starting");

    let config = ContactFormConfig::from_env()
        .inspect_err(|e| error!(error = %e, "config_invalid"))
        .context("Failed to load configuration")?;
    info!(
        port = config.port,
        smtp_host = %config.smtp.host,
        appwrite_endpoint = %config.appwrite.endpoint,
        persistence_enabled = config.appwrite.collection().is_some(),
        required_fields = ?config.form.required_fields,
        "config_loaded"
    );

    let store: Option<Arc<dyn SubmissionStore>> = AppwriteStore::from_config(
        &config.appwrite,
        Duration::from_millis(config.http_timeout_ms),
    )
    .context("Failed to build document store client")?
    .map(|store| Arc::new(store) as Arc<dyn SubmissionStore>);

    let notifier = SmtpNotifier::new(&config.smtp).context("Failed to build SMTP transport")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = ContactFormState::new(config, store, Arc::new(notifier));
    let app = contact_form_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "contact_form_listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("contact_form_shutdown_complete");

    Ok(())
}
