//! Session identifiers and per-session data

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::{FlashBag, SessionError};

/// Unique session identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Random v4 UUID
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as a string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(|_| Self(s.to_string()))
            .map_err(|_| SessionError::InvalidSessionId)
    }
}

/// Data stored per session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When the session was last used
    pub last_accessed: DateTime<Utc>,
    /// When the session expires
    pub expires_at: DateTime<Utc>,
    /// Application attributes
    pub attributes: HashMap<String, serde_json::Value>,
    /// Pending flash messages
    pub flashes: FlashBag,
}

impl SessionData {
    /// New session expiring in 24 hours
    #[must_use]
    pub fn new() -> Self {
        Self::with_expiration(Duration::hours(24))
    }

    /// New session expiring after `duration`
    #[must_use]
    pub fn with_expiration(duration: Duration) -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            last_accessed: now,
            expires_at: now + duration,
            attributes: HashMap::new(),
            flashes: FlashBag::new(),
        }
    }

    /// Whether the session has expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Mark as used now and push expiry out by `extend_by`
    pub fn touch(&mut self, extend_by: Duration) {
        self.last_accessed = Utc::now();
        self.expires_at = self.last_accessed + extend_by;
    }

    /// Typed attribute; `None` if absent or of another shape
    #[must_use]
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Store an attribute
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Serialization`] if `value` cannot be
    /// represented as JSON.
    pub fn set<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> Result<(), SessionError> {
        self.attributes.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Remove an attribute
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.attributes.remove(key)
    }

    /// Whether there are no attributes and no pending flashes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.flashes.is_empty()
    }

    /// Drop attributes and flashes, keeping timestamps
    pub fn clear(&mut self) {
        self.attributes.clear();
        self.flashes.clear();
    }
}

impl Default for SessionData {
    fn default() -> Self {
        Self::new()
    }
}
