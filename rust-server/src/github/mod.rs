//! Issue events and the issue comment API.
//!
//! ```text
//! x-github-event + raw body → parse_delivery() → IssueEvent → IssueCommenter
//! ```

pub mod client;
pub mod events;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

pub use client::GitHubClient;
pub use events::{greeting_comment, parse_delivery, IssueEvent, OpenedIssue, EVENT_HEADER};

/// An issue on the remote platform. Referenced only, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl fmt::Display for IssueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API token is not a valid header value")]
    InvalidToken,

    #[error("issues API returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Posts comments on issues.
#[async_trait]
pub trait IssueCommenter: Send + Sync {
    async fn create_comment(&self, issue: &IssueRef, body: &str) -> Result<(), GitHubError>;
}
