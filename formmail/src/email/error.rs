//! Email error types

use thiserror::Error;

/// Errors that can occur when composing or transmitting an email
#[derive(Debug, Error)]
pub enum EmailError {
    /// Email has no recipient
    #[error("email must have a recipient")]
    NoRecipient,

    /// Email has no sender
    #[error("email must have a from address")]
    NoSender,

    /// Email has no subject
    #[error("email must have a subject")]
    NoSubject,

    /// Email has no body content
    #[error("email must have text content")]
    NoContent,

    /// Invalid email address format
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// The message could not be assembled
    #[error("failed to build message: {0}")]
    BuildError(String),

    /// SMTP transport error
    #[error("SMTP error: {0}")]
    SmtpError(String),

    /// Transport configuration error
    #[error("email configuration error: {0}")]
    ConfigError(String),
}

impl EmailError {
    /// Create an SMTP error from a string message
    #[must_use]
    pub fn smtp<T: Into<String>>(msg: T) -> Self {
        Self::SmtpError(msg.into())
    }

    /// Create a message build error from a string message
    #[must_use]
    pub fn build<T: Into<String>>(msg: T) -> Self {
        Self::BuildError(msg.into())
    }

    /// Create a configuration error from a string message
    #[must_use]
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::ConfigError(msg.into())
    }
}
