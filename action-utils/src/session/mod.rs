//! Sessions and flash messages
//!
//! [`SessionLayer`](crate::middleware::SessionLayer) loads or creates a
//! session for each request and installs a [`Session`] handle in the request
//! extensions. Handlers write flashes and attributes through the handle; the
//! layer saves the result once the handler returns.
//!
//! ```rust
//! use action_utils::session::{FlashLevel, Session, SessionData, SessionId};
//!
//! let session = Session::new(SessionId::generate(), SessionData::new());
//! session.add_flash("notice", "Saved");
//! session.flash(FlashLevel::Error, "But not published");
//!
//! assert_eq!(session.take_flashes("notice"), vec!["Saved".to_string()]);
//! assert!(session.peek_flashes("notice").is_empty());
//! ```

mod data;
mod flash;
mod store;

pub use data::{SessionData, SessionId};
pub use flash::{FlashBag, FlashLevel};
pub use store::{MemorySessionStore, PURGE_EVERY};

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;
use thiserror::Error;

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// Cookie value is not a session id
    #[error("invalid session id")]
    InvalidSessionId,

    /// An attribute could not be serialized
    #[error("session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Handle to the current request's session
///
/// Clones share the same data. Each operation holds the lock only for its
/// own duration.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    data: Arc<Mutex<SessionData>>,
}

impl Session {
    /// Wrap session data
    #[must_use]
    pub fn new(id: SessionId, data: SessionData) -> Self {
        Self {
            id,
            data: Arc::new(Mutex::new(data)),
        }
    }

    /// Session id
    #[must_use]
    pub const fn id(&self) -> &SessionId {
        &self.id
    }

    /// Append a flash message under `kind`
    pub fn add_flash(&self, kind: &str, message: &str) {
        self.data.lock().flashes.add(kind, message);
    }

    /// Append a flash message under a conventional level
    pub fn flash(&self, level: FlashLevel, message: impl Into<String>) {
        self.data.lock().flashes.add(level.as_str(), message);
    }

    /// Messages under `kind`, left in place
    #[must_use]
    pub fn peek_flashes(&self, kind: &str) -> Vec<String> {
        self.data.lock().flashes.peek(kind).to_vec()
    }

    /// Remove and return messages under `kind`
    #[must_use]
    pub fn take_flashes(&self, kind: &str) -> Vec<String> {
        self.data.lock().flashes.get(kind)
    }

    /// Remove and return every flash message
    #[must_use]
    pub fn take_all_flashes(&self) -> BTreeMap<String, Vec<String>> {
        self.data.lock().flashes.all()
    }

    /// Typed attribute
    #[must_use]
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.data.lock().get(key)
    }

    /// Store an attribute
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Serialization`] if `value` cannot be
    /// represented as JSON.
    pub fn set<T: Serialize>(&self, key: impl Into<String>, value: T) -> Result<(), SessionError> {
        self.data.lock().set(key, value)
    }

    /// Remove an attribute
    pub fn remove(&self, key: &str) -> Option<serde_json::Value> {
        self.data.lock().remove(key)
    }

    /// Run `f` with exclusive access to the data
    pub fn with_data<R>(&self, f: impl FnOnce(&mut SessionData) -> R) -> R {
        f(&mut *self.data.lock())
    }

    /// Copy of the current data
    #[must_use]
    pub fn snapshot(&self) -> SessionData {
        self.data.lock().clone()
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "Session not initialized"))
    }
}

/// Extractor that consumes every pending flash message
///
/// Empty when no session layer is installed.
#[derive(Debug, Clone, Default)]
pub struct Flashes(pub BTreeMap<String, Vec<String>>);

impl<S> FromRequestParts<S> for Flashes
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<Session>()
                .map(Session::take_all_flashes)
                .unwrap_or_default(),
        ))
    }
}
