//! Web server module for the issue bot and the contact form.
//!
//! Each request runs a linear pipeline:
//!
//! ```text
//! IncomingRequest → validation gates → one action chain → reply
//! ```
//!
//! No state is shared between requests beyond the configuration and clients
//! built at startup.

pub mod dispatch;
pub mod form;
pub mod handlers;
pub mod outcome;
pub mod pages;
pub mod request;
pub mod signature;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use dispatch::{dispatch_form, dispatch_issue_event, FormReply, WebhookReply};
pub use form::{validate, FormPolicy, OriginAllowList, Submission};
pub use handlers::{
    form_page, health, issue_webhook, submit_form, ContactFormState, HealthResponse,
    IssueBotState, WebhookResponse,
};
pub use outcome::{Rejection, ValidationOutcome};
pub use request::IncomingRequest;
pub use signature::{sign, verify, SignaturePolicy};

/// Routes for the issue bot.
pub fn issue_bot_router(state: IssueBotState) -> Router {
    Router::new()
        .route("/", post(issue_webhook))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Routes for the contact form.
pub fn contact_form_router(state: ContactFormState) -> Router {
    Router::new()
        .route("/", get(form_page).post(submit_form))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Completes when SIGINT or SIGTERM is received.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "sigint_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!(signal = "SIGINT", "shutdown_signal_received"),
        _ = terminate => info!(signal = "SIGTERM", "shutdown_signal_received"),
    }
}
