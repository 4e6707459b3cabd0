//! Mailer construction input

use std::fmt;

use serde::{Deserialize, Serialize};

use super::is_valid_address;
use crate::email::SmtpCredentials;
use crate::error::MailerError;

/// Credentials and recipient a [`Mailer`](super::Mailer) is built from
///
/// Deserializes from the `{username, password, emailTo}` mapping.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailerConfig {
    /// SMTP username
    #[serde(default)]
    pub username: String,

    /// SMTP password
    #[serde(default)]
    pub password: String,

    /// Fixed recipient mailbox
    #[serde(default, rename = "emailTo")]
    pub email_to: String,
}

impl MailerConfig {
    /// Create a config from its three parts
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        email_to: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email_to: email_to.into(),
        }
    }

    /// Check the config; the first failing check wins
    ///
    /// # Errors
    ///
    /// Returns `MailerError::Config` with one of, in check order:
    /// `Missing SMTP username`, `Missing SMTP password`,
    /// `Missing receiving email address`, `Invalid receiving email address`
    pub fn validate(&self) -> Result<(), MailerError> {
        if self.username.is_empty() {
            return Err(MailerError::config("Missing SMTP username"));
        }

        if self.password.is_empty() {
            return Err(MailerError::config("Missing SMTP password"));
        }

        if self.email_to.is_empty() {
            return Err(MailerError::config("Missing receiving email address"));
        }

        if !is_valid_address(&self.email_to) {
            return Err(MailerError::config("Invalid receiving email address"));
        }

        Ok(())
    }

    /// The SMTP login held by this config
    #[must_use]
    pub fn credentials(&self) -> SmtpCredentials {
        SmtpCredentials::new(self.username.clone(), self.password.clone())
    }
}

impl fmt::Debug for MailerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailerConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email_to", &self.email_to)
            .finish()
    }
}
