//! Session state
//!
//! The relay keeps exactly one piece of per-visitor state: the CSRF token.
//! It lives in a [`SessionStore`], an injected key-value collaborator, keyed
//! by [`SessionId`]. A [`Session`] is one visitor's view of that store.
//!
//! [`SessionLayer`] maps the session cookie onto a [`Session`] for every
//! request and [`SessionExtractor`] hands it to handlers.

mod extractor;
mod middleware;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use extractor::SessionExtractor;
pub use middleware::{SameSite, SessionConfig, SessionLayer, SessionMiddleware, SESSION_COOKIE_NAME};

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// Session identifier is not a valid UUID
    #[error("invalid session id")]
    InvalidSessionId,
}

/// Unique session identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new random session ID
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from a string
    ///
    /// # Errors
    ///
    /// Returns error if the string is not a valid UUID
    pub fn try_from_string(s: String) -> Result<Self, SessionError> {
        Uuid::parse_str(&s)
            .map(|_| Self(s))
            .map_err(|_| SessionError::InvalidSessionId)
    }

    /// Get the session ID as a string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from_string(s.to_string())
    }
}

/// Key-value storage for session state
///
/// Implementations must be safe to share across request tasks.
pub trait SessionStore: Send + Sync + 'static {
    /// Read a value from a session
    fn get(&self, id: &SessionId, key: &str) -> Option<String>;

    /// Write a value into a session, replacing any previous value
    fn set(&self, id: &SessionId, key: &str, value: String);

    /// Remove a value from a session
    fn remove(&self, id: &SessionId, key: &str);

    /// Read a value, or create and store it when absent
    ///
    /// The default implementation is not atomic; stores that can do better
    /// should override it.
    fn get_or_insert_with(
        &self,
        id: &SessionId,
        key: &str,
        make: &mut dyn FnMut() -> String,
    ) -> String {
        if let Some(value) = self.get(id, key) {
            return value;
        }
        let value = make();
        self.set(id, key, value.clone());
        value
    }
}

/// Default session lifetime, matching the cookie's `Max-Age`
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(86_400);

/// Upper bound on the time between sweeps of expired sessions
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// One session's values and when they stop being served
#[derive(Debug)]
struct SessionEntry {
    values: HashMap<String, String>,
    expires_at: Instant,
}

impl SessionEntry {
    fn new(ttl: Duration) -> Self {
        Self {
            values: HashMap::new(),
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-process session store
///
/// Sessions expire `ttl` after creation. Expired sessions read as empty and
/// are dropped by a sweep that runs on writes, at most once per
/// `min(ttl, SWEEP_INTERVAL)`, or on demand through
/// [`purge_expired`](Self::purge_expired).
#[derive(Debug)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionEntry>>,
    ttl: Duration,
    next_sweep: Mutex<Instant>,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl MemorySessionStore {
    /// Create an empty store with the default lifetime
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store whose sessions live for `ttl`
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            next_sweep: Mutex::new(Instant::now() + ttl.min(SWEEP_INTERVAL)),
        }
    }

    /// Session lifetime
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of sessions held, including expired ones not yet swept
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Whether no session is held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Drop every expired session, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(now));
        let removed = before - sessions.len();

        if removed > 0 {
            tracing::debug!(
                removed,
                remaining = sessions.len(),
                "Cleaned up expired sessions"
            );
        }

        removed
    }

    fn maybe_sweep(&self) {
        let now = Instant::now();
        {
            let mut next = self.next_sweep.lock();
            if now < *next {
                return;
            }
            *next = now + self.ttl.min(SWEEP_INTERVAL);
        }
        self.purge_expired();
    }

    /// Live entry for `id`, replacing an expired one
    fn live_entry<'a>(
        &self,
        sessions: &'a mut HashMap<SessionId, SessionEntry>,
        id: &SessionId,
    ) -> &'a mut SessionEntry {
        let now = Instant::now();
        let entry = sessions
            .entry(id.clone())
            .or_insert_with(|| SessionEntry::new(self.ttl));
        if entry.is_expired(now) {
            *entry = SessionEntry::new(self.ttl);
        }
        entry
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, id: &SessionId, key: &str) -> Option<String> {
        let now = Instant::now();
        self.sessions
            .read()
            .get(id)
            .filter(|entry| !entry.is_expired(now))
            .and_then(|entry| entry.values.get(key))
            .cloned()
    }

    fn set(&self, id: &SessionId, key: &str, value: String) {
        self.maybe_sweep();
        let mut sessions = self.sessions.write();
        self.live_entry(&mut sessions, id)
            .values
            .insert(key.to_string(), value);
    }

    fn remove(&self, id: &SessionId, key: &str) {
        let mut sessions = self.sessions.write();
        if let Some(entry) = sessions.get_mut(id) {
            entry.values.remove(key);
            if entry.values.is_empty() {
                sessions.remove(id);
            }
        }
    }

    fn get_or_insert_with(
        &self,
        id: &SessionId,
        key: &str,
        make: &mut dyn FnMut() -> String,
    ) -> String {
        self.maybe_sweep();
        let mut sessions = self.sessions.write();
        self.live_entry(&mut sessions, id)
            .values
            .entry(key.to_string())
            .or_insert_with(make)
            .clone()
    }
}

/// One visitor's view of a [`SessionStore`]
#[derive(Clone)]
pub struct Session {
    id: SessionId,
    store: Arc<dyn SessionStore>,
}

impl Session {
    /// Bind a session ID to a store
    #[must_use]
    pub fn new(id: SessionId, store: Arc<dyn SessionStore>) -> Self {
        Self { id, store }
    }

    /// The session identifier
    #[must_use]
    pub const fn id(&self) -> &SessionId {
        &self.id
    }

    /// Read a value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.store.get(&self.id, key)
    }

    /// Write a value
    pub fn set(&self, key: &str, value: String) {
        self.store.set(&self.id, key, value);
    }

    /// Remove a value
    pub fn remove(&self, key: &str) {
        self.store.remove(&self.id, key);
    }

    /// Read a value, or create and store it when absent
    pub fn get_or_insert_with(&self, key: &str, mut make: impl FnMut() -> String) -> String {
        self.store.get_or_insert_with(&self.id, key, &mut make)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("store", &"SessionStore")
            .finish()
    }
}
