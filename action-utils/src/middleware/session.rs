//! Cookie-based session middleware
//!
//! Reads the session cookie, loads the session from a
//! [`MemorySessionStore`] (or starts a new one), installs a [`Session`]
//! handle in the request extensions and saves the session after the
//! handler returns. A new session is only stored, and only gets a
//! `Set-Cookie` header, once the handler has put something in it.

use axum::{
    extract::Request,
    http::header::{COOKIE, SET_COOKIE},
    response::Response,
};
use chrono::Duration;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::config::SessionSettings;
use crate::session::{MemorySessionStore, Session, SessionData, SessionId};

/// Layer installing [`SessionMiddleware`]
#[derive(Debug, Clone)]
pub struct SessionLayer {
    settings: Arc<SessionSettings>,
    store: MemorySessionStore,
}

impl SessionLayer {
    /// Layer with default cookie settings
    #[must_use]
    pub fn new(store: MemorySessionStore) -> Self {
        Self::with_settings(store, SessionSettings::default())
    }

    /// Layer with explicit cookie settings
    #[must_use]
    pub fn with_settings(store: MemorySessionStore, settings: SessionSettings) -> Self {
        Self {
            settings: Arc::new(settings),
            store,
        }
    }
}

impl<S> Layer<S> for SessionLayer {
    type Service = SessionMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionMiddleware {
            inner,
            settings: Arc::clone(&self.settings),
            store: self.store.clone(),
        }
    }
}

/// Session middleware service
#[derive(Debug, Clone)]
pub struct SessionMiddleware<S> {
    inner: S,
    settings: Arc<SessionSettings>,
    store: MemorySessionStore,
}

impl<S> Service<Request> for SessionMiddleware<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let settings = Arc::clone(&self.settings);
        let store = self.store.clone();
        // Drive the clone that was polled ready.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let ttl = session_ttl(&settings);

            let existing = extract_session_id(&req, &settings.cookie_name)
                .and_then(|id| store.load(&id).map(|data| (id, data)));
            let (session_id, data, is_new) = match existing {
                Some((id, data)) => (id, data, false),
                None => (SessionId::generate(), SessionData::with_expiration(ttl), true),
            };

            let session = Session::new(session_id.clone(), data);
            req.extensions_mut().insert(session.clone());

            let mut response = inner.call(req).await?;

            let mut data = session.snapshot();
            if is_new && data.is_empty() {
                return Ok(response);
            }
            data.touch(ttl);
            store.save(session_id.clone(), data);

            if is_new {
                tracing::debug!(session_id = %session_id, "session started");
                set_session_cookie(&mut response, &session_id, &settings);
            }

            Ok(response)
        })
    }
}

fn session_ttl(settings: &SessionSettings) -> Duration {
    i64::try_from(settings.max_age_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or_else(|| Duration::days(1))
}

/// Session id from the request cookies, if well formed
fn extract_session_id(req: &Request, cookie_name: &str) -> Option<SessionId> {
    let cookie_str = req.headers().get(COOKIE)?.to_str().ok()?;

    cookie_str
        .split(';')
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(name, _)| name.trim() == cookie_name)
        .and_then(|(_, value)| SessionId::from_str(value.trim()).ok())
}

fn set_session_cookie(response: &mut Response, session_id: &SessionId, settings: &SessionSettings) {
    let mut cookie_value = format!(
        "{}={}; Path={}; Max-Age={}; SameSite={}",
        settings.cookie_name,
        session_id.as_str(),
        settings.cookie_path,
        settings.max_age_secs,
        settings.same_site.as_str()
    );

    if settings.http_only {
        cookie_value.push_str("; HttpOnly");
    }
    if settings.secure {
        cookie_value.push_str("; Secure");
    }

    match cookie_value.parse() {
        Ok(header_value) => {
            response.headers_mut().append(SET_COOKIE, header_value);
        }
        Err(_) => tracing::warn!(cookie = %settings.cookie_name, "session cookie is not a valid header value"),
    }
}
