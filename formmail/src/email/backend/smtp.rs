//! SMTP backend for sending emails
//!
//! Uses the `lettre` crate to submit messages to an SMTP server with
//! username/password authentication.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::{header, Mailbox},
    transport::smtp::authentication::Credentials,
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::{Deserialize, Serialize};

use crate::email::{Email, EmailError, EmailSender};

/// How the SMTP connection is secured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Plain connection upgraded with STARTTLS (usually port 587)
    #[default]
    StartTls,
    /// Implicit TLS from the first byte (usually port 465)
    Tls,
    /// No encryption; only for local relays and test servers
    None,
}

/// SMTP server location and connection parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpSettings {
    /// SMTP server hostname
    pub host: String,

    /// SMTP server port
    pub port: u16,

    /// Connection security
    pub security: SmtpSecurity,

    /// Connection and command timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            security: SmtpSecurity::StartTls,
            timeout_secs: 10,
        }
    }
}

/// SMTP login credentials
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    username: String,
    password: String,
}

impl SmtpCredentials {
    /// Create credentials from a username and password
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The SMTP username
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// SMTP email backend
///
/// Opens an authenticated connection per message.
#[derive(Debug, Clone)]
pub struct SmtpBackend {
    settings: SmtpSettings,
    credentials: SmtpCredentials,
}

impl SmtpBackend {
    /// Create a new SMTP backend
    #[must_use]
    pub const fn new(settings: SmtpSettings, credentials: SmtpCredentials) -> Self {
        Self {
            settings,
            credentials,
        }
    }

    /// The connection settings in use
    #[must_use]
    pub const fn settings(&self) -> &SmtpSettings {
        &self.settings
    }

    /// Build a lettre `Message` from an [`Email`]
    fn build_message(email: &Email) -> Result<Message, EmailError> {
        email.validate()?;

        let from_addr = email.from.as_deref().ok_or(EmailError::NoSender)?;
        let from = Mailbox::new(email.from_name.clone(), parse_address(from_addr)?);

        let to_addr = email.to.as_deref().ok_or(EmailError::NoRecipient)?;
        let to = Mailbox::new(None, parse_address(to_addr)?);

        let mut builder = Message::builder().from(from).to(to);

        if let Some(reply_to_addr) = email.reply_to.as_deref() {
            builder = builder.reply_to(Mailbox::new(None, parse_address(reply_to_addr)?));
        }

        let subject = email.subject.as_deref().ok_or(EmailError::NoSubject)?;
        let text = email.text.clone().ok_or(EmailError::NoContent)?;

        builder
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(text)
            .map_err(|e| EmailError::build(e.to_string()))
    }

    /// Create an authenticated SMTP transport from the settings
    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let credentials = Credentials::new(
            self.credentials.username.clone(),
            self.credentials.password.clone(),
        );

        let builder = match self.settings.security {
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.settings.host)
                    .map_err(|e| EmailError::smtp(e.to_string()))?
            }
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&self.settings.host)
                .map_err(|e| EmailError::smtp(e.to_string()))?,
            SmtpSecurity::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.settings.host)
            }
        };

        let transport = builder
            .port(self.settings.port)
            .credentials(credentials)
            .timeout(Some(Duration::from_secs(self.settings.timeout_secs)))
            .build();

        Ok(transport)
    }
}

fn parse_address(address: &str) -> Result<Address, EmailError> {
    address
        .parse()
        .map_err(|_| EmailError::InvalidAddress(address.to_string()))
}

#[async_trait]
impl EmailSender for SmtpBackend {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        let message = Self::build_message(&email)?;
        let transport = self.create_transport()?;

        tracing::debug!(
            host = %self.settings.host,
            port = self.settings.port,
            security = ?self.settings.security,
            username = %self.credentials.username,
            "Submitting message over SMTP"
        );

        transport
            .send(message)
            .await
            .map_err(|e| EmailError::smtp(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_email() -> Email {
        Email::new()
            .to("inbox@example.com")
            .from("visitor@example.org")
            .from_name("Visitor")
            .subject("New email from website")
            .text("Hello")
    }

    #[test]
    fn test_smtp_settings_defaults() {
        let settings = SmtpSettings::default();
        assert_eq!(settings.host, "smtp.gmail.com");
        assert_eq!(settings.port, 587);
        assert_eq!(settings.security, SmtpSecurity::StartTls);
        assert_eq!(settings.timeout_secs, 10);
    }

    #[test]
    fn test_security_deserializes_lowercase() {
        let security: SmtpSecurity = serde_json::from_str("\"starttls\"").unwrap();
        assert_eq!(security, SmtpSecurity::StartTls);
        let security: SmtpSecurity = serde_json::from_str("\"tls\"").unwrap();
        assert_eq!(security, SmtpSecurity::Tls);
        let security: SmtpSecurity = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(security, SmtpSecurity::None);
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = SmtpCredentials::new("user", "hunter2");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("user"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_build_message_simple() {
        let message = SmtpBackend::build_message(&sample_email());
        assert!(message.is_ok());
    }

    #[test]
    fn test_build_message_with_reply_to() {
        let email = sample_email().reply_to("someone@example.net");
        let message = SmtpBackend::build_message(&email).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("Reply-To:"));
        assert!(formatted.contains("someone@example.net"));
        assert!(formatted.contains("Visitor"));
        assert!(formatted.contains("visitor@example.org"));
        assert!(formatted.contains("inbox@example.com"));
    }

    #[test]
    fn test_build_message_rejects_bad_address() {
        let email = sample_email().reply_to("not an address");
        assert!(matches!(
            SmtpBackend::build_message(&email),
            Err(EmailError::InvalidAddress(addr)) if addr == "not an address"
        ));
    }

    #[test]
    fn test_build_message_requires_content() {
        let mut email = sample_email();
        email.text = None;
        assert!(matches!(
            SmtpBackend::build_message(&email),
            Err(EmailError::NoContent)
        ));
    }
}
