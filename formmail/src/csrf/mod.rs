//! CSRF tokens
//!
//! One token per session, generated lazily from 256 bytes of OS-seeded
//! randomness and hex-encoded (512 characters). The token is stored in the
//! session under [`TOKEN_SESSION_KEY`] and reused for the session's lifetime
//! until [`clear_token`] removes it.
//!
//! ```rust
//! use std::sync::Arc;
//! use formmail::csrf;
//! use formmail::session::{MemorySessionStore, Session, SessionId};
//!
//! let session = Session::new(SessionId::generate(), Arc::new(MemorySessionStore::new()));
//! let token = csrf::get_token(&session);
//!
//! assert_eq!(token.as_str().len(), 512);
//! assert_eq!(csrf::get_token(&session), token);
//! assert!(csrf::verify_token(&session, token.as_str()));
//! ```

use std::fmt;

use rand::RngCore;

use crate::session::Session;

/// Session key holding the token
pub const TOKEN_SESSION_KEY: &str = "Token";

/// Random bytes per token (hex encoding doubles the length)
pub const TOKEN_BYTES: usize = 256;

/// A CSRF token string
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Generate a new token from a cryptographically secure RNG
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Get the token as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap an existing token value
    #[must_use]
    pub const fn from_string(s: String) -> Self {
        Self(s)
    }

    /// Compare against a caller-supplied value in constant time
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        constant_time_eq(self.0.as_bytes(), candidate.as_bytes())
    }
}

impl fmt::Display for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CsrfToken").field(&"<redacted>").finish()
    }
}

/// Return the session's token, generating and storing one if needed
///
/// Idempotent within a session.
#[must_use]
pub fn get_token(session: &Session) -> CsrfToken {
    let value = session.get_or_insert_with(TOKEN_SESSION_KEY, || {
        tracing::debug!(session_id = %session.id(), "Generating CSRF token");
        CsrfToken::generate().0
    });
    CsrfToken(value)
}

/// Remove the session's token; the next [`get_token`] generates a new one
pub fn clear_token(session: &Session) {
    session.remove(TOKEN_SESSION_KEY);
}

/// Check a submitted token against the one stored in the session
///
/// Returns `false` when the session has no token.
#[must_use]
pub fn verify_token(session: &Session, candidate: &str) -> bool {
    session
        .get(TOKEN_SESSION_KEY)
        .is_some_and(|stored| CsrfToken(stored).matches(candidate))
}

/// Length leaks, contents don't: every byte pair is inspected.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
