//! Configuration management for formmail
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `FORMMAIL_` prefix, `__` for nesting)
//! 2. An explicit file passed with `--config`
//! 3. `./formmail.toml` (development)
//! 4. `~/.config/formmail/config.toml` (user config, XDG)
//! 5. `/etc/formmail/config.toml` (system config)
//! 6. Hardcoded defaults (fallback)
//!
//! Environment variable format: `FORMMAIL_SECTION__FIELD_NAME`, for example
//! `FORMMAIL_SMTP__PASSWORD=app-password` or `FORMMAIL_MAIL__EMAIL_TO=inbox@example.com`.
//!
//! # Example Configuration
//!
//! ```toml
//! transport = "smtp"
//!
//! [server]
//! bind = "0.0.0.0:3000"
//!
//! [smtp]
//! host = "smtp.gmail.com"
//! port = 587
//! security = "starttls"
//! username = "me@gmail.com"
//!
//! [mail]
//! email_to = "inbox@example.com"
//! ajax = false
//!
//! [security]
//! require_token = true
//! ```

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::email::{SmtpSecurity, SmtpSettings};
use crate::mailer::{MailerConfig, DEFAULT_SUBJECT};
use crate::session::SessionConfig;

/// Application name used for config directories
pub const APP_NAME: &str = "formmail";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "FORMMAIL_";

/// HTTP listener configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to listen on
    pub bind: SocketAddr,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

/// SMTP connection and login
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpSection {
    /// SMTP server hostname
    pub host: String,
    /// SMTP server port
    pub port: u16,
    /// Connection security
    pub security: SmtpSecurity,
    /// Connection and command timeout in seconds
    pub timeout_secs: u64,
    /// SMTP username
    pub username: String,
    /// SMTP password
    pub password: String,
}

impl Default for SmtpSection {
    fn default() -> Self {
        let settings = SmtpSettings::default();
        Self {
            host: settings.host,
            port: settings.port,
            security: settings.security,
            timeout_secs: settings.timeout_secs,
            username: String::new(),
            password: String::new(),
        }
    }
}

impl SmtpSection {
    /// Connection parameters without the login
    #[must_use]
    pub fn settings(&self) -> SmtpSettings {
        SmtpSettings {
            host: self.host.clone(),
            port: self.port,
            security: self.security,
            timeout_secs: self.timeout_secs,
        }
    }
}

impl fmt::Debug for SmtpSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSection")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("security", &self.security)
            .field("timeout_secs", &self.timeout_secs)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Message defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailSettings {
    /// Fixed recipient mailbox
    pub email_to: String,
    /// Subject used when the form omits one
    pub subject: String,
    /// Answer every request in Ajax mode
    pub ajax: bool,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            email_to: String::new(),
            subject: DEFAULT_SUBJECT.to_string(),
            ajax: false,
        }
    }
}

/// Security configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    /// Reject submissions that carry no CSRF token
    pub require_token: bool,
}

/// Which transport delivers messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Authenticated SMTP submission
    #[default]
    Smtp,
    /// Log messages instead of sending them
    Console,
}

/// Complete formmail configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormMailConfig {
    /// Message transport
    pub transport: TransportKind,

    /// HTTP listener
    pub server: ServerSettings,

    /// SMTP connection and login
    pub smtp: SmtpSection,

    /// Recipient and message defaults
    pub mail: MailSettings,

    /// Session cookie
    pub session: SessionConfig,

    /// CSRF enforcement
    pub security: SecuritySettings,
}

impl FormMailConfig {
    /// Load configuration from the standard locations
    ///
    /// `explicit` is merged after the discovered files and before the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns error if a file cannot be parsed or a value has the wrong type
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Self::defaults()?;

        let system_config = PathBuf::from("/etc").join(APP_NAME).join("config.toml");
        if system_config.exists() {
            figment = figment.merge(Toml::file(&system_config));
        }

        let user_config = Self::recommended_path();
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }

        let local_config = PathBuf::from(format!("./{APP_NAME}.toml"));
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        if let Some(path) = explicit {
            anyhow::ensure!(path.exists(), "Config file not found: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        let config = figment.merge(Self::env()).extract()?;
        Ok(config)
    }

    /// Load configuration from a single file plus the environment
    ///
    /// A missing file is treated as empty.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be parsed or a value has the wrong type
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config = Self::defaults()?
            .merge(Toml::file(path.as_ref()))
            .merge(Self::env())
            .extract()?;
        Ok(config)
    }

    /// User config path, `~/.config/formmail/config.toml` on Linux
    #[must_use]
    pub fn recommended_path() -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from(format!("./{APP_NAME}.toml")),
            |config_dir| config_dir.join(APP_NAME).join("config.toml"),
        )
    }

    /// The mailer construction mapping
    #[must_use]
    pub fn mailer_config(&self) -> MailerConfig {
        MailerConfig::new(
            self.smtp.username.clone(),
            self.smtp.password.clone(),
            self.mail.email_to.clone(),
        )
    }

    fn defaults() -> anyhow::Result<Figment> {
        Ok(Figment::new().merge(Toml::string(&toml::to_string(&Self::default())?)))
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__").lowercase(true)
    }
}
