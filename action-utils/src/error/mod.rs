//! Umbrella error for handlers
//!
//! Each collaborator has its own error type and the controller helpers
//! return those unchanged. [`ActionUtilsError`] collects them so a handler
//! can use `?` across several helpers and still return a response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::auth::SecurityError;
use crate::forms::FormError;
use crate::registry::RegistryError;
use crate::response::ResponseError;
use crate::routing::RoutingError;
use crate::session::SessionError;
use crate::template::TemplateError;

/// Any error raised by the controller helpers
#[derive(Debug, Error)]
pub enum ActionUtilsError {
    /// Template rendering failed
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Form creation or binding failed
    #[error(transparent)]
    Form(#[from] FormError),

    /// URL generation failed
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// Response construction failed
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// Current user unavailable
    #[error(transparent)]
    Security(#[from] SecurityError),

    /// Database registry lookup failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Session attribute failed
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl IntoResponse for ActionUtilsError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}
