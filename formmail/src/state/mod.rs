//! Application state shared by the handlers

use std::sync::Arc;
use std::time::Duration;

use crate::config::{FormMailConfig, TransportKind};
use crate::email::{ConsoleBackend, EmailSender, SmtpBackend};
use crate::error::MailerError;
use crate::session::{MemorySessionStore, SessionStore};

/// Application state for the relay
///
/// Cheap to clone; every field is shared.
#[derive(Clone)]
pub struct AppState {
    config: Arc<FormMailConfig>,
    sender: Arc<dyn EmailSender>,
    store: Arc<dyn SessionStore>,
}

impl AppState {
    /// Build state from configuration
    ///
    /// Validates the mailer configuration up front and picks the transport
    /// named by `transport`.
    ///
    /// # Errors
    ///
    /// Returns `MailerError::Config` if credentials or recipient are invalid
    pub fn new(config: FormMailConfig) -> Result<Self, MailerError> {
        let mailer_config = config.mailer_config();
        mailer_config.validate()?;

        let sender: Arc<dyn EmailSender> = match config.transport {
            TransportKind::Smtp => Arc::new(SmtpBackend::new(
                config.smtp.settings(),
                mailer_config.credentials(),
            )),
            TransportKind::Console => Arc::new(ConsoleBackend::verbose()),
        };

        tracing::info!(
            transport = ?config.transport,
            recipient = %config.mail.email_to,
            "Mail transport ready"
        );

        Ok(Self::with_sender(config, sender))
    }

    /// Build state around an existing transport
    ///
    /// Sessions live in memory for `session.max_age_secs`, the same lifetime
    /// as the cookie.
    #[must_use]
    pub fn with_sender(config: FormMailConfig, sender: Arc<dyn EmailSender>) -> Self {
        let ttl = Duration::from_secs(config.session.max_age_secs);
        Self {
            config: Arc::new(config),
            sender,
            store: Arc::new(MemorySessionStore::with_ttl(ttl)),
        }
    }

    /// Replace the session store
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = store;
        self
    }

    /// Application configuration
    #[must_use]
    pub fn config(&self) -> &FormMailConfig {
        &self.config
    }

    /// Shared transport
    #[must_use]
    pub fn sender(&self) -> Arc<dyn EmailSender> {
        Arc::clone(&self.sender)
    }

    /// Shared session store
    #[must_use]
    pub fn store(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.store)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("sender", &"EmailSender")
            .field("store", &"SessionStore")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_config, MockEmailSender};

    #[test]
    fn test_rejects_invalid_config() {
        let err = AppState::new(FormMailConfig::default()).unwrap_err();
        assert_eq!(err, MailerError::config("Missing SMTP username"));
    }

    #[test]
    fn test_builds_console_transport() {
        let mut config = test_config();
        config.transport = TransportKind::Console;
        let state = AppState::new(config).unwrap();
        assert_eq!(state.config().transport, TransportKind::Console);
    }

    #[test]
    fn test_builds_smtp_transport() {
        assert!(AppState::new(test_config()).is_ok());
    }

    #[test]
    fn test_with_sender() {
        let state = AppState::with_sender(test_config(), Arc::new(MockEmailSender::new()));
        assert_eq!(state.config().mail.email_to, "inbox@example.com");
        assert!(format!("{state:?}").contains("AppState"));
    }
}
