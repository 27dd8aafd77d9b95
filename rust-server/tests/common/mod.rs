//! Shared helpers for router tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Response;

use sitehooks::github::GitHubError;
use sitehooks::mail::{MailError, NotificationEmail, Notifier};
use sitehooks::store::{StoreError, SubmissionStore};
use sitehooks::web::Submission;
use sitehooks::{
    ContactFormConfig, ContactFormState, IssueBotConfig, IssueBotState, IssueCommenter, IssueRef,
};

pub const WEBHOOK_SECRET: &str = "It's a Secret to Everybody";

fn lookup(pairs: Vec<(&'static str, &'static str)>) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<&'static str, &'static str> = pairs.into_iter().collect();
    move |name| map.get(name).map(|v| v.to_string())
}

pub fn issue_bot_config(require_signature: bool) -> IssueBotConfig {
    IssueBotConfig::from_lookup(lookup(vec![
        ("GITHUB_WEBHOOK_SECRET", WEBHOOK_SECRET),
        ("GITHUB_TOKEN", "ghs_test_token"),
        (
            "REQUIRE_WEBHOOK_SIGNATURE",
            if require_signature { "true" } else { "false" },
        ),
    ]))
    .expect("valid issue bot config")
}

pub fn contact_form_config() -> ContactFormConfig {
    ContactFormConfig::from_lookup(lookup(vec![
        ("SUBMIT_EMAIL", "owner@example.com"),
        ("SMTP_HOST", "smtp.example.com"),
        ("SMTP_USERNAME", "forms@example.com"),
        ("SMTP_PASSWORD", "hunter2"),
        ("ALLOWED_ORIGINS", "https://example.com"),
        ("APPWRITE_ENDPOINT", "https://cloud.appwrite.io/v1"),
        ("APPWRITE_PROJECT", "project-1"),
    ]))
    .expect("valid contact form config")
}

/// Records every comment; optionally fails each call.
#[derive(Default)]
pub struct RecordingCommenter {
    pub calls: Mutex<Vec<(IssueRef, String)>>,
    pub fail: bool,
}

impl RecordingCommenter {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<(IssueRef, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueCommenter for RecordingCommenter {
    async fn create_comment(&self, issue: &IssueRef, body: &str) -> Result<(), GitHubError> {
        self.calls
            .lock()
            .unwrap()
            .push((issue.clone(), body.to_string()));
        if self.fail {
            return Err(GitHubError::Status {
                status: 502,
                message: "Bad Gateway".to_string(),
            });
        }
        Ok(())
    }
}

/// Records every saved submission's email; optionally fails each call.
#[derive(Default)]
pub struct RecordingStore {
    pub saved: Mutex<Vec<String>>,
    pub fail: bool,
}

impl RecordingStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn saved(&self) -> Vec<String> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionStore for RecordingStore {
    async fn save(&self, submission: &Submission) -> Result<(), StoreError> {
        if self.fail {
            return Err(StoreError::Status {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        self.saved
            .lock()
            .unwrap()
            .push(submission.email().to_string());
        Ok(())
    }
}

/// Records every notification; optionally fails each call.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<NotificationEmail>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<NotificationEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, email: &NotificationEmail) -> Result<(), MailError> {
        if self.fail {
            // Any address parse failure stands in for a transport failure.
            return Err(MailError::Address(
                "not an address"
                    .parse::<lettre::Address>()
                    .expect_err("invalid address"),
            ));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub fn issue_bot_state(
    require_signature: bool,
    commenter: Arc<RecordingCommenter>,
) -> IssueBotState {
    IssueBotState::new(issue_bot_config(require_signature), commenter)
}

pub fn contact_form_state(
    store: Option<Arc<RecordingStore>>,
    notifier: Arc<RecordingNotifier>,
) -> ContactFormState {
    ContactFormState::new(
        contact_form_config(),
        store.map(|s| s as Arc<dyn SubmissionStore>),
        notifier,
    )
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get("location")
        .expect("location header")
        .to_str()
        .unwrap()
        .to_string()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
