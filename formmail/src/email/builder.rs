//! Email builder with fluent API

use serde::{Deserialize, Serialize};

use super::EmailError;

/// A composed email message, ready for a transport
///
/// A relay message always has exactly one recipient and a plain text body.
///
/// ```rust
/// use formmail::email::Email;
///
/// let email = Email::new()
///     .to("inbox@example.com")
///     .from("visitor@example.org")
///     .from_name("Visitor")
///     .reply_to("visitor@example.org")
///     .subject("New email from website")
///     .text("Hello!");
///
/// assert!(email.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    /// Recipient (To)
    pub to: Option<String>,

    /// Sender address (From)
    pub from: Option<String>,

    /// Sender display name
    pub from_name: Option<String>,

    /// Reply-To address
    pub reply_to: Option<String>,

    /// Email subject
    pub subject: Option<String>,

    /// Plain text body
    pub text: Option<String>,
}

impl Email {
    /// Create a new empty email
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the recipient
    #[must_use]
    pub fn to(mut self, address: &str) -> Self {
        self.to = Some(address.to_string());
        self
    }

    /// Set the sender address
    #[must_use]
    pub fn from(mut self, address: &str) -> Self {
        self.from = Some(address.to_string());
        self
    }

    /// Set the sender display name
    #[must_use]
    pub fn from_name(mut self, name: &str) -> Self {
        self.from_name = Some(name.to_string());
        self
    }

    /// Set the reply-to address
    #[must_use]
    pub fn reply_to(mut self, address: &str) -> Self {
        self.reply_to = Some(address.to_string());
        self
    }

    /// Set the subject
    #[must_use]
    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    /// Set the plain text body
    #[must_use]
    pub fn text(mut self, body: &str) -> Self {
        self.text = Some(body.to_string());
        self
    }

    /// Validate that all required parts are present
    ///
    /// # Errors
    ///
    /// Returns the first missing part: recipient, sender, subject, content
    pub fn validate(&self) -> Result<(), EmailError> {
        if self.to.is_none() {
            return Err(EmailError::NoRecipient);
        }

        if self.from.is_none() {
            return Err(EmailError::NoSender);
        }

        if self.subject.is_none() {
            return Err(EmailError::NoSubject);
        }

        if self.text.is_none() {
            return Err(EmailError::NoContent);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_builder() {
        let email = Email::new()
            .to("inbox@example.com")
            .from("visitor@example.org")
            .from_name("Visitor")
            .subject("Test")
            .text("Hello, World!");

        assert_eq!(email.to.as_deref(), Some("inbox@example.com"));
        assert_eq!(email.from.as_deref(), Some("visitor@example.org"));
        assert_eq!(email.from_name.as_deref(), Some("Visitor"));
        assert_eq!(email.subject.as_deref(), Some("Test"));
        assert_eq!(email.text.as_deref(), Some("Hello, World!"));
        assert!(email.reply_to.is_none());
    }

    #[test]
    fn test_email_validation_no_recipient() {
        let email = Email::new().from("a@example.com").subject("Test").text("Hello");
        assert!(matches!(email.validate(), Err(EmailError::NoRecipient)));
    }

    #[test]
    fn test_email_validation_no_sender() {
        let email = Email::new().to("a@example.com").subject("Test").text("Hello");
        assert!(matches!(email.validate(), Err(EmailError::NoSender)));
    }

    #[test]
    fn test_email_validation_no_subject() {
        let email = Email::new().to("a@example.com").from("b@example.com").text("Hello");
        assert!(matches!(email.validate(), Err(EmailError::NoSubject)));
    }

    #[test]
    fn test_email_validation_no_content() {
        let email = Email::new()
            .to("a@example.com")
            .from("b@example.com")
            .subject("Test");
        assert!(matches!(email.validate(), Err(EmailError::NoContent)));
    }
}
