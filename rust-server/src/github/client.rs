//! Minimal issues API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::Serialize;
use tracing::info;
use url::Url;

use super::{GitHubError, IssueCommenter, IssueRef};

const USER_AGENT: &str = concat!("sitehooks-issue-bot/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

/// Request to create a comment.
#[derive(Debug, Serialize)]
struct CreateCommentRequest<'a> {
    body: &'a str,
}

/// Token-authenticated client for the issues API.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    api_url: String,
}

impl GitHubClient {
    pub fn new(api_url: &Url, token: &str, timeout: Duration) -> Result<Self, GitHubError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let mut auth = HeaderValue::try_from(format!("Bearer {token}"))
            .map_err(|_| GitHubError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.as_str().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl IssueCommenter for GitHubClient {
    async fn create_comment(&self, issue: &IssueRef, body: &str) -> Result<(), GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.api_url, issue.owner, issue.repo, issue.number
        );

        let response = self
            .client
            .post(&url)
            .json(&CreateCommentRequest { body })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GitHubError::Status {
                status: status.as_u16(),
                message,
            });
        }

        info!(issue = %issue, status = status.as_u16(), "issue_comment_created");

        Ok(())
    }
}
