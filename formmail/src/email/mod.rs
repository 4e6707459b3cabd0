//! Outbound email transport
//!
//! This module provides the transport collaborator the mailer delegates to:
//! - [`Email`]: a single composed message (one recipient, plain text body)
//! - [`EmailSender`]: the transport trait
//! - [`SmtpBackend`]: authenticated SMTP submission via `lettre`
//! - [`ConsoleBackend`]: logs messages instead of sending them (development)
//!
//! # Examples
//!
//! ```rust,no_run
//! use formmail::email::{Email, EmailSender, SmtpBackend, SmtpCredentials, SmtpSettings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SmtpBackend::new(
//!     SmtpSettings::default(),
//!     SmtpCredentials::new("user@gmail.com", "app-password"),
//! );
//!
//! let email = Email::new()
//!     .to("inbox@example.com")
//!     .from("visitor@example.org")
//!     .from_name("Visitor")
//!     .subject("New email from website")
//!     .text("Hello!");
//!
//! backend.send(email).await?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod builder;
mod error;
mod sender;

pub use backend::{
    console::ConsoleBackend,
    smtp::{SmtpBackend, SmtpCredentials, SmtpSecurity, SmtpSettings},
};
pub use builder::Email;
pub use error::EmailError;
pub use sender::EmailSender;

#[cfg(test)]
pub use sender::MockEmailSender as MockEmailSenderTrait;
