//! formmail: a minimal form-to-email relay
//!
//! Accepts a contact form submission, validates the sender fields, checks
//! an optional per-session CSRF token, and delivers the message to one fixed
//! mailbox over authenticated SMTP.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use formmail::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     formmail::observability::init()?;
//!
//!     let config = FormMailConfig::load(None)?;
//!     formmail::server::serve(config).await
//! }
//! ```
//!
//! # Using the mailer directly
//!
//! ```rust,no_run
//! use formmail::prelude::*;
//!
//! # async fn example() -> Result<(), MailerError> {
//! let config = MailerConfig::new("user@gmail.com", "app-password", "inbox@example.com");
//! let mut mailer = Mailer::new(config, &SmtpSettings::default())?;
//!
//! let draft = mailer.draft_mut();
//! draft.from_email = "visitor@example.org".to_string();
//! draft.from_name = "Visitor".to_string();
//! draft.body = Mailer::<SmtpBackend>::prepare_message(
//!     "Hello!",
//!     &RequestContext::new(Some("example.com"), Some("/contact")),
//! );
//!
//! mailer.send().await
//! # }
//! ```

#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod csrf;
pub mod email;
pub mod error;
pub mod handlers;
pub mod mailer;
pub mod observability;
pub mod server;
pub mod session;
pub mod state;
pub mod testing;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! ```rust
    //! use formmail::prelude::*;
    //! ```

    pub use crate::config::{FormMailConfig, TransportKind};
    pub use crate::csrf::CsrfToken;
    pub use crate::email::{
        ConsoleBackend, Email, EmailError, EmailSender, SmtpBackend, SmtpCredentials,
        SmtpSecurity, SmtpSettings,
    };
    pub use crate::error::MailerError;
    pub use crate::mailer::{
        prepare_message, Mailer, MailerConfig, MessageDraft, RequestContext, ResponseMode,
        SendStage,
    };
    pub use crate::server::{router, serve};
    pub use crate::session::{
        MemorySessionStore, Session, SessionExtractor, SessionId, SessionLayer, SessionStore,
    };
    pub use crate::state::AppState;
}
