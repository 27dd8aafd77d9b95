//! HTTP endpoint handlers.
//!
//! Both handlers are linear: build the request view, run the gates, dispatch
//! at most one action chain, shape the reply.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::{ContactFormConfig, IssueBotConfig};
use crate::error::ErrorCode;
use crate::github::{parse_delivery, IssueCommenter, EVENT_HEADER};
use crate::mail::Notifier;
use crate::store::SubmissionStore;
use crate::web::dispatch::{
    dispatch_form, dispatch_issue_event, FormActions, FormReply, WebhookReply,
};
use crate::web::form::validate;
use crate::web::pages::{INDEX_PAGE, SUCCESS_PAGE};
use crate::web::request::IncomingRequest;
use crate::web::signature::SIGNATURE_HEADER;

/// Shared state of the issue bot.
#[derive(Clone)]
pub struct IssueBotState {
    pub config: Arc<IssueBotConfig>,
    pub commenter: Arc<dyn IssueCommenter>,
}

impl IssueBotState {
    pub fn new(config: IssueBotConfig, commenter: Arc<dyn IssueCommenter>) -> Self {
        Self {
            config: Arc::new(config),
            commenter,
        }
    }
}

/// Shared state of the contact form.
#[derive(Clone)]
pub struct ContactFormState {
    pub config: Arc<ContactFormConfig>,
    pub store: Option<Arc<dyn SubmissionStore>>,
    pub notifier: Arc<dyn Notifier>,
}

impl ContactFormState {
    pub fn new(
        config: ContactFormConfig,
        store: Option<Arc<dyn SubmissionStore>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            notifier,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Issue Bot Webhook
// =============================================================================

/// Webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl WebhookResponse {
    fn ok(status: &'static str) -> Self {
        Self { status, error: None }
    }

    fn failed(status: &'static str, error: &'static str) -> Self {
        Self {
            status,
            error: Some(error),
        }
    }
}

/// Issue event endpoint.
///
/// This endpoint:
/// 1. Verifies the signature over the raw body
/// 2. Classifies the event, ignoring anything but opened issues
/// 3. Posts one greeting comment
pub async fn issue_webhook(
    State(state): State<IssueBotState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let request = IncomingRequest::new(method, uri.path(), &headers, body);

    info!(
        event = request.header(EVENT_HEADER).unwrap_or(""),
        has_signature = request.header(SIGNATURE_HEADER).is_some(),
        body_length = request.body().len(),
        "webhook_received"
    );

    let authentic = state.config.signature_policy.check(
        &state.config.webhook_secret,
        request.body(),
        request.header(SIGNATURE_HEADER),
    );
    if !authentic {
        warn!("webhook_signature_invalid");
        return (
            StatusCode::UNAUTHORIZED,
            Json(WebhookResponse::failed("unauthorized", "invalid-signature")),
        );
    }

    let event = match parse_delivery(request.header(EVENT_HEADER), request.body()) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "webhook_payload_invalid");
            return (
                StatusCode::BAD_REQUEST,
                Json(WebhookResponse::failed("error", ErrorCode::InvalidRequest.as_str())),
            );
        }
    };

    match dispatch_issue_event(&event, state.commenter.as_ref()).await {
        Ok(WebhookReply::Commented(issue)) => {
            info!(issue = %issue, "webhook_issue_commented");
            (StatusCode::OK, Json(WebhookResponse::ok("ok")))
        }
        Ok(WebhookReply::Ignored) => (StatusCode::OK, Json(WebhookResponse::ok("ignored"))),
        Err(e) => {
            error!(error = %e, "webhook_dispatch_failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(WebhookResponse::failed("error", e.code().as_str())),
            )
        }
    }
}

// =============================================================================
// Contact Form
// =============================================================================

/// Static form page.
pub async fn form_page() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

/// Form submission endpoint.
///
/// Rejections and downstream failures redirect back to the referring page
/// with an error code; success renders the success page or follows `_next`.
pub async fn submit_form(
    State(state): State<ContactFormState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = IncomingRequest::new(method, uri.path(), &headers, body);
    let referer = request.header("referer");

    info!(
        has_referer = referer.is_some(),
        body_length = request.body().len(),
        "form_received"
    );

    let outcome = validate(&request, &state.config.form);

    // Posts stopped at the content-type or origin gate get no CORS header.
    let cors_origin = match outcome.rejection() {
        Some(rejection) if rejection.code == ErrorCode::InvalidRequest => None,
        _ => state.config.form.allowed_origins.cors_origin(referer),
    };

    let actions = FormActions {
        store: state.store.as_deref(),
        notifier: state.notifier.as_ref(),
        recipient: &state.config.submit_email,
        sender: &state.config.smtp.username,
    };
    let reply = dispatch_form(outcome, referer, &actions).await;

    form_response(reply, cors_origin)
}

fn form_response(reply: FormReply, cors_origin: Option<String>) -> Response {
    let mut response = match reply {
        FormReply::SuccessPage => (StatusCode::OK, Html(SUCCESS_PAGE)).into_response(),
        FormReply::Redirect(location) => {
            (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
        }
    };

    if let Some(value) = cors_origin.and_then(|origin| HeaderValue::from_str(&origin).ok()) {
        response
            .headers_mut()
            .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }

    response
}
