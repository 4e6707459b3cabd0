//! Console backend for development
//!
//! Logs messages instead of sending them, so the relay can run without SMTP
//! credentials for a real mailbox.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::email::{Email, EmailError, EmailSender};

/// Console email backend
///
/// Logs the envelope at `info` and, when verbose, the body at `debug`.
#[derive(Debug, Clone, Default)]
pub struct ConsoleBackend {
    verbose: bool,
}

impl ConsoleBackend {
    /// Create a new console backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a console backend that also logs the message body
    #[must_use]
    pub const fn verbose() -> Self {
        Self { verbose: true }
    }
}

#[async_trait]
impl EmailSender for ConsoleBackend {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        email.validate()?;

        let from = email.from.as_deref().ok_or(EmailError::NoSender)?;
        let to = email.to.as_deref().ok_or(EmailError::NoRecipient)?;
        let subject = email.subject.as_deref().ok_or(EmailError::NoSubject)?;

        info!(
            from = %from,
            from_name = ?email.from_name,
            to = %to,
            reply_to = ?email.reply_to,
            subject = %subject,
            "Console email sent"
        );

        if self.verbose {
            if let Some(text) = &email.text {
                debug!(text = %text, "Email text content");
            }
        }

        Ok(())
    }
}
