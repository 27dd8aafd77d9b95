//! Turning validation outcomes into side effects and replies.
//!
//! Accepted requests run exactly one action chain, at most once, with no
//! retry and no rollback: if the notification email fails after the
//! submission was persisted, the stored document stays.

use tracing::{error, info, warn};
use url::{form_urlencoded, Url};

use crate::error::DispatchError;
use crate::github::{greeting_comment, IssueCommenter, IssueEvent, IssueRef};
use crate::mail::{NotificationEmail, Notifier};
use crate::store::SubmissionStore;
use crate::web::form::Submission;
use crate::web::outcome::{Rejection, ValidationOutcome};

/// Query parameter carrying the error code.
pub const CODE_PARAM: &str = "code";

/// Query parameter listing missing required fields.
pub const MISSING_PARAM: &str = "missing";

/// How the contact form answers the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormReply {
    SuccessPage,
    Redirect(String),
}

/// How the issue bot answers the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookReply {
    Commented(IssueRef),
    Ignored,
}

/// Collaborators invoked for an accepted submission.
pub struct FormActions<'a> {
    /// `None` when persistence is not configured
    pub store: Option<&'a dyn SubmissionStore>,
    pub notifier: &'a dyn Notifier,
    /// Notification recipient
    pub recipient: &'a str,
    /// Notification sender
    pub sender: &'a str,
}

fn code_pairs(rejection: &Rejection) -> Vec<(&'static str, String)> {
    let mut pairs = vec![(CODE_PARAM, rejection.code.as_str().to_string())];
    if !rejection.missing_fields.is_empty() {
        pairs.push((MISSING_PARAM, rejection.missing_fields.join(",")));
    }
    pairs
}

/// The referring page with its error parameters replaced by `rejection`.
///
/// Never fails: without a usable referer the redirect goes to `/`.
pub fn redirect_with_code(referer: Option<&str>, rejection: &Rejection) -> String {
    let mut url = match referer.and_then(|r| Url::parse(r).ok()) {
        Some(url) if !url.cannot_be_a_base() => url,
        _ => {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(code_pairs(rejection))
                .finish();
            return format!("/?{query}");
        }
    };

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != CODE_PARAM && k != MISSING_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .extend_pairs(code_pairs(rejection));

    url.into()
}

/// Resolve a continuation path against the referer's origin.
///
/// Returns `None` when the result would leave that origin, so a client can
/// never turn the form into an open redirect.
pub fn continuation_url(referer: &Url, next: &str) -> Option<Url> {
    let origin = referer.origin();
    if !origin.is_tuple() {
        return None;
    }

    let base = Url::parse(&origin.ascii_serialization()).ok()?;
    let target = base.join(next).ok()?;

    (target.origin() == origin).then_some(target)
}

/// Run the accepted-submission chain: persist (if configured), then notify.
///
/// The first failure aborts the chain.
pub async fn run_form_actions(
    submission: &Submission,
    actions: &FormActions<'_>,
) -> Result<(), DispatchError> {
    if let Some(store) = actions.store {
        store.save(submission).await?;
    }

    let email = NotificationEmail::for_submission(submission, actions.recipient, actions.sender);
    actions.notifier.notify(&email).await?;

    Ok(())
}

/// Answer a form post. Never fails; downstream errors become a
/// `server-error` redirect.
pub async fn dispatch_form(
    outcome: ValidationOutcome<Submission>,
    referer: Option<&str>,
    actions: &FormActions<'_>,
) -> FormReply {
    let submission = match outcome {
        ValidationOutcome::Accepted(submission) => submission,
        ValidationOutcome::Rejected(rejection) => {
            return FormReply::Redirect(redirect_with_code(referer, &rejection));
        }
    };

    if let Err(e) = run_form_actions(&submission, actions).await {
        error!(error = %e, code = %e.code(), "form_action_failed");
        return FormReply::Redirect(redirect_with_code(
            Some(submission.referer.as_str()),
            &Rejection::server_error(),
        ));
    }

    let Some(next) = submission.continuation() else {
        info!("form_submitted");
        return FormReply::SuccessPage;
    };

    match continuation_url(&submission.referer, next) {
        Some(target) => {
            info!(location = %target, "form_submitted_redirecting");
            FormReply::Redirect(target.into())
        }
        None => {
            warn!("form_continuation_off_origin");
            FormReply::SuccessPage
        }
    }
}

/// Answer an authenticated issue event.
///
/// Each opened-issue delivery posts one comment; deliveries are not
/// de-duplicated.
pub async fn dispatch_issue_event(
    event: &IssueEvent,
    commenter: &dyn IssueCommenter,
) -> Result<WebhookReply, DispatchError> {
    match event {
        IssueEvent::Other { event: name, action } => {
            info!(
                event = %name,
                action = action.as_deref().unwrap_or(""),
                "webhook_event_ignored"
            );
            Ok(WebhookReply::Ignored)
        }
        IssueEvent::Opened(opened) => {
            commenter
                .create_comment(&opened.issue, &greeting_comment(&opened.author))
                .await?;
            Ok(WebhookReply::Commented(opened.issue.clone()))
        }
    }
}
