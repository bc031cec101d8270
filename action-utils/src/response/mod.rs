//! Response types returned by the controller helpers
//!
//! [`HtmlResponse`] wraps rendered template output, [`RedirectResponse`]
//! points the client somewhere else. Both implement [`IntoResponse`] so
//! handlers can return them directly.

use axum::response::{Html, IntoResponse, Response};
use http::{header::LOCATION, HeaderMap, HeaderName, HeaderValue, StatusCode};
use thiserror::Error;

/// Status used by redirects when none is given
pub const DEFAULT_REDIRECT_STATUS: StatusCode = StatusCode::FOUND;

/// Statuses a [`RedirectResponse`] accepts
pub const REDIRECT_STATUSES: [StatusCode; 6] = [
    StatusCode::CREATED,
    StatusCode::MOVED_PERMANENTLY,
    StatusCode::FOUND,
    StatusCode::SEE_OTHER,
    StatusCode::TEMPORARY_REDIRECT,
    StatusCode::PERMANENT_REDIRECT,
];

/// Errors raised while constructing a response
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResponseError {
    /// Status is not one clients follow with a `Location` header
    #[error("the HTTP status code is not a redirect (\"{0}\" given)")]
    InvalidRedirectStatus(u16),

    /// Redirect target is empty
    #[error("cannot redirect to an empty URL")]
    EmptyTarget,

    /// Redirect target cannot be used as a header value
    #[error("invalid redirect target: {0}")]
    InvalidTarget(String),
}

/// Rendered HTML page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl HtmlResponse {
    /// Create a `200 OK` response with the given body
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Override the status code
    #[must_use]
    pub const fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Add a response header
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Status code
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Extra headers
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Rendered body
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Take the rendered body
    #[must_use]
    pub fn into_body(self) -> String {
        self.body
    }
}

impl IntoResponse for HtmlResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, Html(self.body)).into_response()
    }
}

/// Redirect to an arbitrary URL
///
/// # Examples
///
/// ```rust
/// use action_utils::response::{RedirectResponse, DEFAULT_REDIRECT_STATUS};
/// use http::StatusCode;
///
/// let redirect = RedirectResponse::new("/login", DEFAULT_REDIRECT_STATUS).unwrap();
/// assert_eq!(redirect.target(), "/login");
/// assert_eq!(redirect.status(), StatusCode::FOUND);
///
/// assert!(RedirectResponse::new("/login", StatusCode::OK).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectResponse {
    target: String,
    location: HeaderValue,
    status: StatusCode,
}

impl RedirectResponse {
    /// Create a redirect
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError`] if the target is empty or not a valid header
    /// value, or if `status` is not one of [`REDIRECT_STATUSES`]. `300`,
    /// `304`, `305` and `306` are refused: clients do not follow them.
    pub fn new(target: impl Into<String>, status: StatusCode) -> Result<Self, ResponseError> {
        let target = target.into();
        if target.is_empty() {
            return Err(ResponseError::EmptyTarget);
        }
        if !REDIRECT_STATUSES.contains(&status) {
            return Err(ResponseError::InvalidRedirectStatus(status.as_u16()));
        }
        let location = HeaderValue::from_str(&target)
            .map_err(|_| ResponseError::InvalidTarget(target.clone()))?;

        Ok(Self {
            target,
            location,
            status,
        })
    }

    /// Redirect target
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Status code
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    fn body(&self) -> String {
        let target = escape_html(&self.target);
        format!(
            "<!DOCTYPE html>\n<html>\n    <head>\n        <meta charset=\"UTF-8\" />\n        \
             <meta http-equiv=\"refresh\" content=\"0;url='{target}'\" />\n\n        \
             <title>Redirecting to {target}</title>\n    </head>\n    <body>\n        \
             Redirecting to <a href=\"{target}\">{target}</a>.\n    </body>\n</html>"
        )
    }
}

impl IntoResponse for RedirectResponse {
    fn into_response(self) -> Response {
        let body = self.body();
        (self.status, [(LOCATION, self.location)], Html(body)).into_response()
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
