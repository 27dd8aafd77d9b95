//! SMTP delivery through an authenticated STARTTLS relay.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use super::{MailError, NotificationEmail, Notifier};
use crate::config::SmtpConfig;

/// Notifier backed by a pooled async SMTP transport.
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    /// Build the transport. No connection is made until the first send.
    ///
    /// Must be called inside a Tokio runtime: the connection pool spawns its
    /// idle-connection reaper on build.
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, email: &NotificationEmail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(email.from.parse::<Mailbox>()?)
            .to(email.to.parse::<Mailbox>()?)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(email.text.clone())?;

        let response = self.transport.send(message).await?;

        info!(positive = response.is_positive(), "notification_email_sent");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notifier_builds_without_connecting() {
        let config = SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 2525,
            username: "forms@example.com".to_string(),
            password: "hunter2".to_string(),
        };

        assert!(SmtpNotifier::new(&config).is_ok());
    }

    #[tokio::test]
    async fn test_notify_rejects_bad_sender_address() {
        let config = SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 2525,
            username: "forms".to_string(),
            password: "hunter2".to_string(),
        };
        let notifier = SmtpNotifier::new(&config).unwrap();

        let email = NotificationEmail {
            to: "owner@example.com".to_string(),
            from: "not an address".to_string(),
            subject: "New form submission".to_string(),
            text: "hi".to_string(),
        };

        let err = notifier.notify(&email).await.unwrap_err();
        assert!(matches!(err, MailError::Address(_)));
    }
}
