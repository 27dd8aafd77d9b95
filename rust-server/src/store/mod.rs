//! Optional persistence of accepted form submissions.

pub mod appwrite;

use async_trait::async_trait;
use thiserror::Error;

use crate::web::form::Submission;

pub use appwrite::AppwriteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("document store returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Persists accepted submissions.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn save(&self, submission: &Submission) -> Result<(), StoreError>;
}
