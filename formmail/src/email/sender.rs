//! Email sender trait abstraction

use std::sync::Arc;

use async_trait::async_trait;

use super::{Email, EmailError};

/// Transport collaborator for outbound mail
///
/// Implemented by [`SmtpBackend`](super::SmtpBackend),
/// [`ConsoleBackend`](super::ConsoleBackend) and the test doubles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Transmit a single email
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the email is incomplete or the transport fails;
    /// the error's `Display` is the detail reported to the submitter.
    async fn send(&self, email: Email) -> Result<(), EmailError>;
}

#[async_trait]
impl<T> EmailSender for Arc<T>
where
    T: EmailSender + ?Sized,
{
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        (**self).send(email).await
    }
}
