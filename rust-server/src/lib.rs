//! Sitehooks - two small signed/validated request handlers.
//!
//! This library provides shared modules for the two binaries:
//! - `sitehooks-issue-bot`: verifies signed issue events and greets new issues
//! - `sitehooks-contact-form`: validates contact form posts, stores and
//!   forwards them, then redirects the browser
//!
//! ## Architecture
//!
//! ```text
//! Issue event → signature check → issues API comment
//! Form post   → content-type / origin / field gates → store → email → redirect
//! ```

pub mod config;
pub mod error;
pub mod github;
pub mod mail;
pub mod store;
pub mod web;

// Re-export commonly used types
pub use config::{ContactFormConfig, IssueBotConfig};
pub use error::{ConfigError, DispatchError, ErrorCode};
pub use github::{GitHubClient, IssueCommenter, IssueRef};
pub use mail::{Notifier, SmtpNotifier};
pub use store::{AppwriteStore, SubmissionStore};
pub use web::{contact_form_router, issue_bot_router, ContactFormState, IssueBotState};
