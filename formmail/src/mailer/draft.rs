//! Per-request message fields

use serde::{Deserialize, Serialize};

use super::is_valid_address;
use crate::error::MailerError;

/// Subject used when the submitter does not provide one
pub const DEFAULT_SUBJECT: &str = "New email from website";

/// Message fields populated before a send
///
/// `reply_to` falls back to `from_email` at send time when left unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageDraft {
    /// Sender address
    pub from_email: String,
    /// Sender display name
    pub from_name: String,
    /// Message body
    pub body: String,
    /// Subject line
    pub subject: String,
    /// Reply-To address
    pub reply_to: Option<String>,
}

impl Default for MessageDraft {
    fn default() -> Self {
        Self {
            from_email: String::new(),
            from_name: String::new(),
            body: String::new(),
            subject: DEFAULT_SUBJECT.to_string(),
            reply_to: None,
        }
    }
}

impl MessageDraft {
    /// Create an empty draft with the default subject
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check required fields, then the sender and reply-to addresses
    ///
    /// # Errors
    ///
    /// `Required property missing: <field>` for the first empty field in the
    /// order `fromEmail`, `fromName`, `body`; then
    /// `Sender email address is invalid`; then
    /// `Reply-To email address is invalid` for a set, non-empty `reply_to`.
    pub fn validate(&self) -> Result<(), MailerError> {
        let required = [
            ("fromEmail", &self.from_email),
            ("fromName", &self.from_name),
            ("body", &self.body),
        ];

        if let Some((field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
            return Err(MailerError::validation(format!(
                "Required property missing: {field}"
            )));
        }

        if !is_valid_address(&self.from_email) {
            return Err(MailerError::validation("Sender email address is invalid"));
        }

        if let Some(reply_to) = self.reply_to.as_deref().filter(|r| !r.is_empty()) {
            if !is_valid_address(reply_to) {
                return Err(MailerError::validation("Reply-To email address is invalid"));
            }
        }

        Ok(())
    }

    /// Default `reply_to` to the sender when unset or empty
    pub fn apply_reply_to_default(&mut self) {
        if self.reply_to.as_deref().is_none_or(str::is_empty) {
            self.reply_to = Some(self.from_email.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> MessageDraft {
        MessageDraft {
            from_email: "visitor@example.org".to_string(),
            from_name: "Visitor".to_string(),
            body: "hi".to_string(),
            ..MessageDraft::default()
        }
    }

    #[test]
    fn test_default_subject() {
        assert_eq!(MessageDraft::new().subject, "New email from website");
        assert!(MessageDraft::new().reply_to.is_none());
    }

    #[test]
    fn test_required_fields_in_order() {
        let err = MessageDraft::new().validate().unwrap_err();
        assert_eq!(err.to_string(), "Required property missing: fromEmail");

        let draft = MessageDraft {
            from_email: "visitor@example.org".to_string(),
            ..MessageDraft::default()
        };
        assert_eq!(
            draft.validate().unwrap_err().to_string(),
            "Required property missing: fromName"
        );

        let draft = MessageDraft {
            body: String::new(),
            ..valid()
        };
        assert_eq!(
            draft.validate().unwrap_err().to_string(),
            "Required property missing: body"
        );
    }

    #[test]
    fn test_missing_field_reported_before_bad_address() {
        let draft = MessageDraft {
            from_email: "not-an-email".to_string(),
            from_name: String::new(),
            ..valid()
        };
        assert_eq!(
            draft.validate().unwrap_err().to_string(),
            "Required property missing: fromName"
        );
    }

    #[test]
    fn test_invalid_sender() {
        let draft = MessageDraft {
            from_email: "not-an-email".to_string(),
            from_name: "A".to_string(),
            body: "hi".to_string(),
            ..MessageDraft::default()
        };
        let err = draft.validate().unwrap_err();
        assert_eq!(err, MailerError::validation("Sender email address is invalid"));
    }

    #[test]
    fn test_invalid_reply_to() {
        let draft = MessageDraft {
            reply_to: Some("not-an-email".to_string()),
            ..valid()
        };
        assert_eq!(
            draft.validate().unwrap_err(),
            MailerError::validation("Reply-To email address is invalid")
        );
    }

    #[test]
    fn test_sender_checked_before_reply_to() {
        let draft = MessageDraft {
            from_email: "not-an-email".to_string(),
            reply_to: Some("also-bad".to_string()),
            ..valid()
        };
        assert_eq!(
            draft.validate().unwrap_err().to_string(),
            "Sender email address is invalid"
        );
    }

    #[test]
    fn test_empty_reply_to_is_unset() {
        let draft = MessageDraft {
            reply_to: Some(String::new()),
            ..valid()
        };
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_valid_draft() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_reply_to_default() {
        let mut draft = valid();
        draft.apply_reply_to_default();
        assert_eq!(draft.reply_to.as_deref(), Some("visitor@example.org"));

        let mut draft = MessageDraft {
            reply_to: Some("other@example.net".to_string()),
            ..valid()
        };
        draft.apply_reply_to_default();
        assert_eq!(draft.reply_to.as_deref(), Some("other@example.net"));

        let mut draft = MessageDraft {
            reply_to: Some(String::new()),
            ..valid()
        };
        draft.apply_reply_to_default();
        assert_eq!(draft.reply_to.as_deref(), Some("visitor@example.org"));
    }
}
