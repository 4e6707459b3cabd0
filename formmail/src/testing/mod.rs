//! Testing utilities
//!
//! [`MockEmailSender`] records every email handed to it so handler and
//! mailer tests can assert on what would have been delivered, and
//! [`test_config`] gives a configuration that passes mailer validation.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::config::FormMailConfig;
use crate::email::{Email, EmailError, EmailSender};

/// Recording email sender
///
/// ```rust
/// use formmail::email::{Email, EmailSender};
/// use formmail::testing::MockEmailSender;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mock = MockEmailSender::new();
///
/// let email = Email::new()
///     .to("inbox@example.com")
///     .from("visitor@example.org")
///     .subject("Test")
///     .text("Hello");
///
/// mock.send(email).await?;
///
/// assert_eq!(mock.sent_count(), 1);
/// assert!(mock.was_sent_to("inbox@example.com"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockEmailSender {
    sent: Arc<Mutex<Vec<Email>>>,
    failure: Option<String>,
}

impl MockEmailSender {
    /// Create a sender that accepts every email
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sender whose every send fails with an SMTP error
    #[must_use]
    pub fn failing(detail: impl Into<String>) -> Self {
        Self {
            sent: Arc::default(),
            failure: Some(detail.into()),
        }
    }

    /// Number of emails accepted
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    /// All accepted emails, oldest first
    #[must_use]
    pub fn sent_emails(&self) -> Vec<Email> {
        self.sent.lock().clone()
    }

    /// The most recently accepted email
    #[must_use]
    pub fn last_sent(&self) -> Option<Email> {
        self.sent.lock().last().cloned()
    }

    /// Whether an email went to `address`
    #[must_use]
    pub fn was_sent_to(&self, address: &str) -> bool {
        self.sent
            .lock()
            .iter()
            .any(|email| email.to.as_deref() == Some(address))
    }

    /// Forget recorded emails
    pub fn clear(&self) {
        self.sent.lock().clear();
    }
}

#[async_trait]
impl EmailSender for MockEmailSender {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        if let Some(detail) = &self.failure {
            return Err(EmailError::smtp(detail.clone()));
        }

        email.validate()?;
        self.sent.lock().push(email);
        Ok(())
    }
}

/// Configuration with valid credentials and recipient `inbox@example.com`
#[must_use]
pub fn test_config() -> FormMailConfig {
    let mut config = FormMailConfig::default();
    config.smtp.username = "relay@example.com".to_string();
    config.smtp.password = "app-password".to_string();
    config.mail.email_to = "inbox@example.com".to_string();
    config.session.secure = false;
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> Email {
        Email::new()
            .to("inbox@example.com")
            .from("visitor@example.org")
            .subject("Test")
            .text("Hello")
    }

    #[tokio::test]
    async fn test_records_sent_email() {
        let mock = MockEmailSender::new();
        mock.send(email()).await.unwrap();

        assert_eq!(mock.sent_count(), 1);
        assert!(mock.was_sent_to("inbox@example.com"));
        assert!(!mock.was_sent_to("other@example.com"));
        assert_eq!(mock.last_sent().unwrap().subject.as_deref(), Some("Test"));
    }

    #[tokio::test]
    async fn test_clones_share_records() {
        let mock = MockEmailSender::new();
        let clone = mock.clone();
        clone.send(email()).await.unwrap();

        assert_eq!(mock.sent_count(), 1);
        mock.clear();
        assert_eq!(clone.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_failing_sender() {
        let mock = MockEmailSender::failing("connection refused");
        let err = mock.send(email()).await.unwrap_err();

        assert_eq!(err.to_string(), "SMTP error: connection refused");
        assert_eq!(mock.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_rejects_incomplete_email() {
        let mock = MockEmailSender::new();
        assert!(mock.send(Email::new()).await.is_err());
        assert!(mock.sent_emails().is_empty());
    }

    #[test]
    fn test_config_is_valid() {
        assert!(test_config().mailer_config().validate().is_ok());
    }
}
