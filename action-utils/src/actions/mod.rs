//! Controller helpers
//!
//! [`ActionUtils`] is the set of conveniences a handler usually reaches for:
//! render a template, build a form, flash a message, generate a URL,
//! redirect, reach the database registry, and read the current user.
//! [`ActionContext`] implements it by delegating each call to an injected
//! collaborator, so handlers depend on the helpers instead of on a base
//! controller type.
//!
//! `ActionContext` is an axum extractor. It needs an
//! [`ActionUtilsState`](crate::state::ActionUtilsState) reachable through
//! `FromRef` and a [`SessionLayer`](crate::middleware::SessionLayer) on the
//! router.
//!
//! ```rust,no_run
//! use action_utils::prelude::*;
//! use axum::{routing::get, Router};
//!
//! async fn show(actions: ActionContext<AuthUser, ()>) -> Result<HtmlResponse, ActionUtilsError> {
//!     actions.add_flash("notice", "Welcome back");
//!     let user = actions.user()?;
//!     Ok(actions.render(
//!         "home.html",
//!         &Parameters::new().with("user", user.map(|u| u.email)),
//!     )?)
//! }
//!
//! # fn app(state: ActionUtilsState<()>) -> Router {
//! Router::new()
//!     .route("/", get(show))
//!     .layer(state.session_layer())
//!     .with_state(state)
//! # }
//! ```

mod context;

pub use context::ActionContext;

#[cfg(feature = "postgres")]
pub use context::PgActionContext;
#[cfg(feature = "sqlite")]
pub use context::SqliteActionContext;

use axum::http::StatusCode;
use serde_json::Value;

use crate::auth::SecurityError;
use crate::error::ActionUtilsError;
use crate::forms::{Form, FormBuilder, FormError, FormOptions};
use crate::params::Parameters;
use crate::response::{HtmlResponse, RedirectResponse, ResponseError};
use crate::routing::{ReferenceType, RoutingError};
use crate::template::TemplateError;

/// Conveniences for request handlers
///
/// Every method hands off to one collaborator and returns its result or
/// error unchanged. The single exception is [`user`](Self::user), which
/// turns "nobody is logged in" into `Ok(None)`.
pub trait ActionUtils {
    /// The application's user type
    type User;

    /// The database registry handle
    type Registry;

    /// Render `view` into a 200 HTML response
    ///
    /// # Errors
    ///
    /// Whatever the template engine raises.
    fn render(&self, view: &str, parameters: &Parameters) -> Result<HtmlResponse, TemplateError>;

    /// Render `view` to a string
    ///
    /// # Errors
    ///
    /// Whatever the template engine raises.
    fn render_view(&self, view: &str, parameters: &Parameters) -> Result<String, TemplateError>;

    /// Create a form of a registered type
    ///
    /// # Errors
    ///
    /// [`FormError::UnknownType`] for an unregistered type, or whatever the
    /// type raises while building.
    fn create_form(
        &self,
        form_type: &str,
        data: Option<Value>,
        options: FormOptions,
    ) -> Result<Form, FormError>;

    /// Create a builder for a form with no predefined fields
    ///
    /// # Errors
    ///
    /// Whatever the form factory raises, e.g. for non-object data.
    fn create_form_builder(
        &self,
        data: Option<Value>,
        options: FormOptions,
    ) -> Result<FormBuilder, FormError>;

    /// Append a flash message of type `kind` to the session
    fn add_flash(&self, kind: &str, message: &str);

    /// Generate a URL for a named route
    ///
    /// # Errors
    ///
    /// [`RoutingError`] for an unknown route or missing parameters.
    fn generate_url(
        &self,
        route: &str,
        parameters: &Parameters,
        reference_type: ReferenceType,
    ) -> Result<String, RoutingError>;

    /// Redirect to `url`
    ///
    /// # Errors
    ///
    /// [`ResponseError`] for a status clients do not follow or an unusable URL.
    fn redirect(&self, url: &str, status: StatusCode) -> Result<RedirectResponse, ResponseError>;

    /// Redirect to a named route
    ///
    /// Same as [`redirect`](Self::redirect) applied to
    /// [`generate_url`](Self::generate_url) with an absolute path.
    ///
    /// # Errors
    ///
    /// The error of whichever of the two steps failed.
    fn redirect_to_route(
        &self,
        route: &str,
        parameters: &Parameters,
        status: StatusCode,
    ) -> Result<RedirectResponse, ActionUtilsError> {
        let url = self.generate_url(route, parameters, ReferenceType::AbsolutePath)?;
        Ok(self.redirect(&url, status)?)
    }

    /// The database registry, as injected
    fn registry(&self) -> &Self::Registry;

    /// The authenticated user
    ///
    /// `Ok(None)` when no token is stored or the token's principal is
    /// anonymous.
    ///
    /// # Errors
    ///
    /// [`SecurityError::NotConfigured`] when no token storage is available.
    fn user(&self) -> Result<Option<Self::User>, SecurityError>;
}
