//! The form mailer
//!
//! A [`Mailer`] holds validated credentials and a fixed recipient, collects
//! one message's fields in a [`MessageDraft`], optionally checks a CSRF token
//! against the visitor's [`Session`], and hands the composed [`Email`] to an
//! [`EmailSender`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use formmail::email::SmtpSettings;
//! use formmail::mailer::{Mailer, MailerConfig};
//!
//! # async fn example() -> Result<(), formmail::error::MailerError> {
//! let config = MailerConfig::new("user@gmail.com", "app-password", "inbox@example.com");
//! let mut mailer = Mailer::new(config, &SmtpSettings::default())?;
//!
//! let draft = mailer.draft_mut();
//! draft.from_email = "visitor@example.org".to_string();
//! draft.from_name = "Visitor".to_string();
//! draft.body = "Hello!".to_string();
//!
//! mailer.send().await?;
//! # Ok(())
//! # }
//! ```

mod compose;
mod config;
mod draft;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use validator::ValidateEmail;

pub use compose::{prepare_message, RequestContext, GENERIC_GREETING};
pub use config::MailerConfig;
pub use draft::{MessageDraft, DEFAULT_SUBJECT};

use crate::csrf;
use crate::email::{Email, EmailSender, SmtpBackend, SmtpSettings};
use crate::error::{MailerError, INVALID_TOKEN};
use crate::session::Session;

/// Syntactic email address check shared by config and draft validation
pub(crate) fn is_valid_address(address: &str) -> bool {
    address.validate_email()
}

/// How the outcome of a send is presented to the HTTP client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// Errors propagate to the caller
    #[default]
    Exception,
    /// Failures become `400 {"status": 400, "detail": ...}`, success an empty 200
    Ajax,
}

impl ResponseMode {
    /// Select Ajax mode when `ajax` is set
    #[must_use]
    pub const fn from_ajax(ajax: bool) -> Self {
        if ajax {
            Self::Ajax
        } else {
            Self::Exception
        }
    }

    /// Whether this is Ajax mode
    #[must_use]
    pub const fn is_ajax(self) -> bool {
        matches!(self, Self::Ajax)
    }

    /// Turn a send outcome into an HTTP response
    ///
    /// Exception mode answers `200 Message sent` or the error's own plain-text
    /// rendering (see [`MailerError`]'s `IntoResponse`).
    #[must_use]
    pub fn respond(self, result: Result<(), MailerError>) -> Response {
        match (self, result) {
            (Self::Ajax, Ok(())) => StatusCode::OK.into_response(),
            (Self::Ajax, Err(err)) => err.into_ajax_response(),
            (Self::Exception, Ok(())) => (StatusCode::OK, "Message sent").into_response(),
            (Self::Exception, Err(err)) => err.into_response(),
        }
    }
}

/// Where a send attempt is, or where it ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SendStage {
    /// No send attempted yet
    #[default]
    Ready,
    /// Checking message fields
    Validating,
    /// Comparing the CSRF token
    CheckingToken,
    /// Handing the message to the transport
    Transmitting,
    /// Transport accepted the message
    Succeeded,
    /// A step failed; nothing further was attempted
    Failed,
}

/// Form-to-email relay for one outbound message
#[derive(Debug)]
pub struct Mailer<T = SmtpBackend> {
    config: MailerConfig,
    sender: T,
    draft: MessageDraft,
    response_mode: ResponseMode,
    token: Option<String>,
    token_required: bool,
    session: Option<Session>,
    stage: SendStage,
}

impl Mailer<SmtpBackend> {
    /// Create a mailer submitting over SMTP with the config's credentials
    ///
    /// # Errors
    ///
    /// Returns `MailerError::Config` if the config is invalid
    pub fn new(config: MailerConfig, smtp: &SmtpSettings) -> Result<Self, MailerError> {
        config.validate()?;
        let backend = SmtpBackend::new(smtp.clone(), config.credentials());
        Self::with_sender(config, backend)
    }
}

impl<T: EmailSender> Mailer<T> {
    /// Create a mailer with any transport
    ///
    /// # Errors
    ///
    /// Returns `MailerError::Config` if the config is invalid
    pub fn with_sender(config: MailerConfig, sender: T) -> Result<Self, MailerError> {
        config.validate()?;
        Ok(Self {
            config,
            sender,
            draft: MessageDraft::default(),
            response_mode: ResponseMode::default(),
            token: None,
            token_required: false,
            session: None,
            stage: SendStage::Ready,
        })
    }

    /// The validated config
    #[must_use]
    pub const fn config(&self) -> &MailerConfig {
        &self.config
    }

    /// The message fields
    #[must_use]
    pub const fn draft(&self) -> &MessageDraft {
        &self.draft
    }

    /// Mutable access to the message fields
    pub fn draft_mut(&mut self) -> &mut MessageDraft {
        &mut self.draft
    }

    /// Current response mode
    #[must_use]
    pub const fn response_mode(&self) -> ResponseMode {
        self.response_mode
    }

    /// Select the response mode
    pub fn set_response_mode(&mut self, mode: ResponseMode) {
        self.response_mode = mode;
    }

    /// Require the given CSRF token to match the session's at send time
    ///
    /// # Errors
    ///
    /// Returns `MailerError::Validation` if the token is empty
    pub fn set_token(&mut self, token: impl Into<String>) -> Result<(), MailerError> {
        let token = token.into();
        if token.is_empty() {
            return Err(MailerError::validation("Token must not be empty"));
        }
        self.token = Some(token);
        Ok(())
    }

    /// Run the CSRF check even when no token was set
    ///
    /// A missing token then fails like a mismatched one.
    pub fn require_token(&mut self) {
        self.token_required = true;
    }

    /// Attach the visitor's session, used for the CSRF check
    pub fn set_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// Builder-style [`set_session`](Self::set_session)
    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.set_session(session);
        self
    }

    /// Where the last send attempt got to
    #[must_use]
    pub const fn stage(&self) -> SendStage {
        self.stage
    }

    /// See [`prepare_message`]
    #[must_use]
    pub fn prepare_message(raw_body: &str, context: &RequestContext) -> String {
        prepare_message(raw_body, context)
    }

    /// Validate, check the token when one was set, and transmit
    ///
    /// Fields set before a failing step stay as they are, but nothing is
    /// transmitted after a failure. No retries.
    ///
    /// # Errors
    ///
    /// - `Validation` for missing fields or a malformed sender address
    /// - `Security("Invalid token")` when a set token does not match
    /// - `Transport` with the transport's detail when submission fails
    pub async fn send(&mut self) -> Result<(), MailerError> {
        let result = self.run().await;

        match &result {
            Ok(()) => {
                self.transition(SendStage::Succeeded);
                info!(
                    recipient = %self.config.email_to,
                    subject = %self.draft.subject,
                    "Form message delivered"
                );
            }
            Err(err) => {
                let failed_at = self.stage;
                self.transition(SendStage::Failed);
                warn!(
                    kind = err.kind(),
                    stage = ?failed_at,
                    error = %err,
                    "Form message rejected"
                );
            }
        }

        result
    }

    async fn run(&mut self) -> Result<(), MailerError> {
        self.transition(SendStage::Validating);
        self.draft.validate()?;
        self.draft.apply_reply_to_default();

        if self.token.is_some() || self.token_required {
            self.transition(SendStage::CheckingToken);
            self.check_token()?;
        }

        self.transition(SendStage::Transmitting);
        let email = self.compose();
        self.sender
            .send(email)
            .await
            .map_err(|e| MailerError::transport(e.to_string()))
    }

    fn check_token(&self) -> Result<(), MailerError> {
        let valid = match (&self.session, &self.token) {
            (Some(session), Some(token)) => csrf::verify_token(session, token),
            _ => false,
        };

        if valid {
            Ok(())
        } else {
            Err(MailerError::security(INVALID_TOKEN))
        }
    }

    fn compose(&self) -> Email {
        let mut email = Email::new()
            .to(&self.config.email_to)
            .from(&self.draft.from_email)
            .from_name(&self.draft.from_name)
            .subject(&self.draft.subject)
            .text(&self.draft.body);

        if let Some(reply_to) = &self.draft.reply_to {
            email = email.reply_to(reply_to);
        }

        email
    }

    fn transition(&mut self, stage: SendStage) {
        debug!(from = ?self.stage, to = ?stage, "Mailer stage");
        self.stage = stage;
    }
}
