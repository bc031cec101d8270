//! Current-user access
//!
//! Authentication itself happens elsewhere. Whatever authenticates a request
//! stores an [`AuthToken`] in the request's [`TokenStorage`]; handlers read
//! the user back through
//! [`ActionUtils::user`](crate::actions::ActionUtils::user) or the
//! [`CurrentUser`] extractor.
//!
//! ```rust,no_run
//! use action_utils::auth::{install_token_storage, AuthUser};
//! use axum::{middleware, routing::get, Router};
//!
//! let app: Router = Router::new()
//!     .route("/", get(|| async { "hi" }))
//!     .layer(middleware::from_fn(install_token_storage::<AuthUser>));
//! ```

mod token;

pub use token::{AuthToken, Principal};

use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Security errors
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SecurityError {
    /// No token storage was installed for this request
    #[error("no token storage is configured; install `install_token_storage` to read the current user")]
    NotConfigured,
}

impl IntoResponse for SecurityError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "security not configured");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}

/// A plain authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// User id
    pub id: i64,
    /// Email address
    pub email: String,
    /// Granted roles
    pub roles: Vec<String>,
}

/// Holds the authentication token for the current request
pub trait TokenStorage<U>: Send + Sync {
    /// The current token, if any
    fn token(&self) -> Option<AuthToken<U>>;

    /// Replace the current token; `None` logs the user out
    fn set_token(&self, token: Option<AuthToken<U>>);
}

/// Token storage scoped to one request
#[derive(Debug)]
pub struct InMemoryTokenStorage<U> {
    token: RwLock<Option<AuthToken<U>>>,
}

impl<U> Default for InMemoryTokenStorage<U> {
    fn default() -> Self {
        Self {
            token: RwLock::new(None),
        }
    }
}

impl<U> InMemoryTokenStorage<U> {
    /// Empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage already holding `token`
    #[must_use]
    pub fn with_token(token: AuthToken<U>) -> Self {
        Self {
            token: RwLock::new(Some(token)),
        }
    }
}

impl<U: Clone + Send + Sync> TokenStorage<U> for InMemoryTokenStorage<U> {
    fn token(&self) -> Option<AuthToken<U>> {
        self.token.read().clone()
    }

    fn set_token(&self, token: Option<AuthToken<U>>) {
        *self.token.write() = token;
    }
}

/// Request extension carrying the token storage
pub struct TokenStorageHandle<U>(pub Arc<dyn TokenStorage<U>>);

impl<U> Clone for TokenStorageHandle<U> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<U> std::fmt::Debug for TokenStorageHandle<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TokenStorageHandle").field(&"dyn TokenStorage").finish()
    }
}

impl<U: Clone + Send + Sync + 'static> TokenStorageHandle<U> {
    /// Handle around fresh, empty in-memory storage
    #[must_use]
    pub fn in_memory() -> Self {
        Self(Arc::new(InMemoryTokenStorage::<U>::new()))
    }

    /// Handle whose storage already holds `user`
    #[must_use]
    pub fn for_user(user: U) -> Self {
        Self(Arc::new(InMemoryTokenStorage::with_token(AuthToken::for_user(user))))
    }
}

/// Middleware installing empty per-request token storage
///
/// Authentication layers added after this one fill the storage through the
/// [`TokenStorageHandle`] extension.
pub async fn install_token_storage<U: Clone + Send + Sync + 'static>(
    mut req: Request,
    next: Next,
) -> Response {
    req.extensions_mut()
        .insert(TokenStorageHandle::<U>::in_memory());
    next.run(req).await
}

/// Extractor for the authenticated user, if any
///
/// Rejects with 500 when no token storage is installed.
#[derive(Debug, Clone)]
pub struct CurrentUser<U>(pub Option<U>);

impl<S, U> FromRequestParts<S> for CurrentUser<U>
where
    S: Send + Sync,
    U: Clone + Send + Sync + 'static,
{
    type Rejection = SecurityError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let storage = parts
            .extensions
            .get::<TokenStorageHandle<U>>()
            .ok_or(SecurityError::NotConfigured)?;
        Ok(Self(user_from_storage(storage.0.as_ref())))
    }
}

/// User held by `storage`; anonymous tokens count as no user
pub(crate) fn user_from_storage<U: Clone>(storage: &(impl TokenStorage<U> + ?Sized)) -> Option<U> {
    storage.token().and_then(|token| token.user().cloned())
}
