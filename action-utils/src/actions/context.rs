//! Request-scoped implementation of [`ActionUtils`]

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use serde_json::Value;

use super::ActionUtils;
use crate::auth::{user_from_storage, SecurityError, TokenStorage, TokenStorageHandle};
use crate::forms::{Form, FormBuilder, FormError, FormFactory, FormOptions, BASE_FORM_TYPE};
use crate::params::Parameters;
use crate::response::{HtmlResponse, RedirectResponse, ResponseError};
use crate::routing::{ReferenceType, RequestContext, RoutingError, UrlGenerator};
use crate::session::Session;
use crate::state::ActionUtilsState;
use crate::template::{TemplateEngine, TemplateError};

/// Controller helpers bound to one request
///
/// `U` is the user type returned by [`ActionUtils::user`]; `R` is the
/// database registry. Cloning is cheap and clones share the session.
pub struct ActionContext<U, R> {
    templates: Arc<dyn TemplateEngine>,
    forms: Arc<dyn FormFactory>,
    session: Session,
    urls: Arc<dyn UrlGenerator>,
    registry: Arc<R>,
    token_storage: Option<Arc<dyn TokenStorage<U>>>,
}

/// Helpers backed by a `PostgreSQL` connection registry
#[cfg(feature = "postgres")]
pub type PgActionContext<U = crate::auth::AuthUser> =
    ActionContext<U, crate::registry::ConnectionRegistry<sqlx::Postgres>>;

/// Helpers backed by a `SQLite` connection registry
#[cfg(feature = "sqlite")]
pub type SqliteActionContext<U = crate::auth::AuthUser> =
    ActionContext<U, crate::registry::ConnectionRegistry<sqlx::Sqlite>>;

impl<U, R> Clone for ActionContext<U, R> {
    fn clone(&self) -> Self {
        Self {
            templates: Arc::clone(&self.templates),
            forms: Arc::clone(&self.forms),
            session: self.session.clone(),
            urls: Arc::clone(&self.urls),
            registry: Arc::clone(&self.registry),
            token_storage: self.token_storage.clone(),
        }
    }
}

impl<U, R> std::fmt::Debug for ActionContext<U, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionContext")
            .field("session", self.session.id())
            .field("token_storage", &self.token_storage.is_some())
            .finish_non_exhaustive()
    }
}

impl<U, R> ActionContext<U, R> {
    /// Helpers over explicit collaborators
    ///
    /// Pass `None` for `token_storage` when the application has no security
    /// layer; [`ActionUtils::user`] then fails with
    /// [`SecurityError::NotConfigured`].
    #[must_use]
    pub fn new(
        templates: Arc<dyn TemplateEngine>,
        forms: Arc<dyn FormFactory>,
        session: Session,
        urls: Arc<dyn UrlGenerator>,
        registry: Arc<R>,
        token_storage: Option<Arc<dyn TokenStorage<U>>>,
    ) -> Self {
        Self {
            templates,
            forms,
            session,
            urls,
            registry,
            token_storage,
        }
    }

    /// The request's session
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Shared handle to the registry, for moving into spawned tasks
    #[must_use]
    pub fn registry_handle(&self) -> Arc<R> {
        Arc::clone(&self.registry)
    }
}

impl<U: Clone, R> ActionUtils for ActionContext<U, R> {
    type User = U;
    type Registry = R;

    fn render(&self, view: &str, parameters: &Parameters) -> Result<HtmlResponse, TemplateError> {
        self.render_view(view, parameters).map(HtmlResponse::new)
    }

    fn render_view(&self, view: &str, parameters: &Parameters) -> Result<String, TemplateError> {
        self.templates.render(view, parameters)
    }

    fn create_form(
        &self,
        form_type: &str,
        data: Option<Value>,
        options: FormOptions,
    ) -> Result<Form, FormError> {
        self.forms.create(form_type, data, options)
    }

    fn create_form_builder(
        &self,
        data: Option<Value>,
        options: FormOptions,
    ) -> Result<FormBuilder, FormError> {
        self.forms.create_builder(BASE_FORM_TYPE, data, options)
    }

    fn add_flash(&self, kind: &str, message: &str) {
        self.session.add_flash(kind, message);
    }

    fn generate_url(
        &self,
        route: &str,
        parameters: &Parameters,
        reference_type: ReferenceType,
    ) -> Result<String, RoutingError> {
        self.urls.generate(route, parameters, reference_type)
    }

    fn redirect(&self, url: &str, status: StatusCode) -> Result<RedirectResponse, ResponseError> {
        RedirectResponse::new(url, status)
    }

    fn registry(&self) -> &R {
        &self.registry
    }

    fn user(&self) -> Result<Option<U>, SecurityError> {
        let storage = self
            .token_storage
            .as_deref()
            .ok_or(SecurityError::NotConfigured)?;
        Ok(user_from_storage(storage))
    }
}

impl<S, U, R> FromRequestParts<S> for ActionContext<U, R>
where
    S: Send + Sync,
    ActionUtilsState<R>: FromRef<S>,
    U: Clone + Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = ActionUtilsState::<R>::from_ref(state);

        let session = parts.extensions.get::<Session>().cloned().ok_or_else(|| {
            tracing::error!("ActionContext extracted without a SessionLayer");
            (StatusCode::INTERNAL_SERVER_ERROR, "Session not initialized")
        })?;

        let token_storage = parts
            .extensions
            .get::<TokenStorageHandle<U>>()
            .map(|handle| Arc::clone(&handle.0));

        let request_context = RequestContext::from_parts(parts, state.routes().context());
        let urls: Arc<dyn UrlGenerator> = Arc::new(state.routes().scoped(request_context));

        Ok(Self::new(
            Arc::clone(state.templates()),
            Arc::clone(state.forms()),
            session,
            urls,
            Arc::clone(state.registry()),
            token_storage,
        ))
    }
}
