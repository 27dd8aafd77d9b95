//! Submission notification emails.

pub mod smtp;

use async_trait::async_trait;
use thiserror::Error;

use crate::web::form::{Submission, CONTINUATION_FIELD};

pub use smtp::SmtpNotifier;

/// A plain-text notification ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEmail {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub text: String,
}

impl NotificationEmail {
    /// Build the notification for an accepted submission.
    pub fn for_submission(submission: &Submission, to: &str, from: &str) -> Self {
        Self {
            to: to.to_string(),
            from: from.to_string(),
            subject: format!("New form submission: {}", submission.referer),
            text: render_form_message(submission),
        }
    }
}

/// Render every submitted field except the continuation path, one
/// `key: value` per line.
pub fn render_form_message(submission: &Submission) -> String {
    let lines: Vec<String> = submission
        .fields
        .iter()
        .filter(|(key, _)| *key != CONTINUATION_FIELD)
        .map(|(key, value)| format!("{key}: {value}"))
        .collect();

    format!("You've received a new message.\n\n{}", lines.join("\n"))
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Sends submission notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, email: &NotificationEmail) -> Result<(), MailError>;
}
