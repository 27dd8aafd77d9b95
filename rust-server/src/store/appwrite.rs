//! Appwrite document store over its REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use super::{StoreError, SubmissionStore};
use crate::config::AppwriteConfig;
use crate::web::form::Submission;

/// Lets the server assign the document id.
const UNIQUE_DOCUMENT_ID: &str = "unique()";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateDocumentRequest<'a> {
    document_id: &'static str,
    data: SubmissionDocument<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionDocument<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    name: &'a str,
    submitted_at: String,
}

/// Creates one document per submission in a fixed collection.
#[derive(Clone)]
pub struct AppwriteStore {
    client: Client,
    documents_url: String,
    project: String,
    api_key: Option<String>,
}

impl AppwriteStore {
    /// Build a store for the configured collection, or `None` when
    /// persistence is not configured.
    pub fn from_config(
        config: &AppwriteConfig,
        timeout: Duration,
    ) -> Result<Option<Self>, StoreError> {
        let Some((database_id, collection_id)) = config.collection() else {
            return Ok(None);
        };

        let client = Client::builder().timeout(timeout).build()?;

        let documents_url = format!(
            "{}/databases/{}/collections/{}/documents",
            config.endpoint.as_str().trim_end_matches('/'),
            database_id,
            collection_id
        );

        Ok(Some(Self {
            client,
            documents_url,
            project: config.project.clone(),
            api_key: config.api_key.clone(),
        }))
    }
}

#[async_trait]
impl SubmissionStore for AppwriteStore {
    async fn save(&self, submission: &Submission) -> Result<(), StoreError> {
        let request = CreateDocumentRequest {
            document_id: UNIQUE_DOCUMENT_ID,
            data: SubmissionDocument {
                email: submission.email(),
                message: submission.message(),
                name: submission.name(),
                submitted_at: submission.submitted_at_rfc3339(),
            },
        };

        let mut builder = self
            .client
            .post(&self.documents_url)
            .header("X-Appwrite-Project", &self.project)
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("X-Appwrite-Key", key);
        }

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StoreError::Status {
                status: status.as_u16(),
                message,
            });
        }

        info!(status = status.as_u16(), "submission_persisted");

        Ok(())
    }
}
