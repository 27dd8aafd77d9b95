//! Error codes and error types shared by both handlers.

use std::fmt;

use thiserror::Error;

use crate::github::GitHubError;
use crate::mail::MailError;
use crate::store::StoreError;

/// User-facing error code.
///
/// Internally this is a closed enum; it only becomes a string at the URL
/// boundary, where it is appended to the redirect target as `?code=...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Wrong content type or an origin outside the allow-list.
    InvalidRequest,
    /// One or more required form fields are absent or empty.
    MissingFormFields,
    /// A downstream action (comment API, database, SMTP) failed.
    ServerError,
}

impl ErrorCode {
    /// The wire representation used in redirect query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "invalid-request",
            ErrorCode::MissingFormFields => "missing-form-fields",
            ErrorCode::ServerError => "server-error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Startup configuration failure. Fatal: the binaries refuse to serve.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// A downstream action failed after the request was accepted.
///
/// Always surfaces to the client as [`ErrorCode::ServerError`]; the detail is
/// only ever logged.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("issue comment failed: {0}")]
    Comment(#[from] GitHubError),

    #[error("submission persistence failed: {0}")]
    Store(#[from] StoreError),

    #[error("notification email failed: {0}")]
    Mail(#[from] MailError),
}

impl DispatchError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::ServerError
    }
}
