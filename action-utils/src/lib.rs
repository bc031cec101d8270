//! action-utils: injectable controller helpers for axum
//!
//! Handlers that render templates, build forms, flash messages, generate
//! URLs and redirect usually inherit all of that from a base controller.
//! This crate offers the same conveniences as a set of collaborators behind
//! the [`ActionUtils`](actions::ActionUtils) trait, extracted per request as
//! an [`ActionContext`](actions::ActionContext).
//!
//! | Helper | Delegates to |
//! |--------|--------------|
//! | `render`, `render_view` | [`TemplateEngine`](template::TemplateEngine) |
//! | `create_form`, `create_form_builder` | [`FormFactory`](forms::FormFactory) |
//! | `add_flash` | the request's [`Session`](session::Session) |
//! | `generate_url`, `redirect_to_route` | [`UrlGenerator`](routing::UrlGenerator) |
//! | `redirect` | [`RedirectResponse`](response::RedirectResponse) |
//! | `registry` | the injected registry, e.g. [`ConnectionRegistry`](registry::ConnectionRegistry) |
//! | `user` | the request's [`TokenStorage`](auth::TokenStorage) |
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use action_utils::prelude::*;
//! use axum::{routing::get, Router};
//!
//! async fn index(actions: ActionContext<AuthUser, ()>) -> Result<HtmlResponse, ActionUtilsError> {
//!     Ok(actions.render("index.html", &Parameters::new().with("title", "Home"))?)
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     action_utils::observability::init()?;
//!
//!     let config = ActionUtilsConfig::load_for_service("blog")?;
//!     let mut routes = RouteTable::new();
//!     routes.add("index", "/")?;
//!     let state = ActionUtilsState::from_config(config, routes, FormRegistry::new(), ());
//!
//!     let app = Router::new()
//!         .route("/", get(index))
//!         .layer(state.session_layer())
//!         .with_state(state);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `postgres` - `PostgreSQL` connection registry (default)
//! - `sqlite` - `SQLite` connection registry

pub mod actions;
pub mod auth;
pub mod config;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod observability;
pub mod params;
pub mod registry;
pub mod response;
pub mod routing;
pub mod session;
pub mod state;
pub mod template;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! ```rust
    //! use action_utils::prelude::*;
    //! ```

    // Controller helpers
    pub use crate::actions::{ActionContext, ActionUtils};
    #[cfg(feature = "postgres")]
    pub use crate::actions::PgActionContext;
    #[cfg(feature = "sqlite")]
    pub use crate::actions::SqliteActionContext;

    // Collaborators
    pub use crate::forms::{
        FieldBuilder, FieldError, Form, FormBuilder, FormError, FormFactory, FormField,
        FormOptions, FormRegistry, FormRenderOptions, FormRenderer, FormType, InputType,
        SelectOption, ValidationErrors,
    };
    pub use crate::routing::{NamedRouter, ReferenceType, RouteTable, RoutingError, UrlGenerator};
    pub use crate::template::{MiniJinjaTemplates, TemplateEngine, TemplateError};

    // Request-scoped pieces
    pub use crate::auth::{
        install_token_storage, AuthToken, AuthUser, CurrentUser, SecurityError, TokenStorage,
        TokenStorageHandle,
    };
    pub use crate::session::{FlashLevel, Flashes, Session};

    // Responses and errors
    pub use crate::error::ActionUtilsError;
    pub use crate::response::{HtmlResponse, RedirectResponse, ResponseError};

    // Wiring
    pub use crate::config::ActionUtilsConfig;
    pub use crate::middleware::SessionLayer;
    pub use crate::params::Parameters;
    pub use crate::registry::{ConnectionRegistry, RegistryError};
    pub use crate::state::ActionUtilsState;

    pub use axum;
    pub use serde_json::json;
}
