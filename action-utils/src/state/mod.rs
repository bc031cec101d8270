//! Shared application state
//!
//! Holds the collaborators that live for the whole application. The
//! per-request pieces (session, token storage, request context) are added by
//! the [`ActionContext`](crate::actions::ActionContext) extractor.
//!
//! # Example
//!
//! ```rust
//! use action_utils::config::ActionUtilsConfig;
//! use action_utils::forms::FormRegistry;
//! use action_utils::routing::RouteTable;
//! use action_utils::state::ActionUtilsState;
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut routes = RouteTable::new();
//! routes.add("home", "/")?;
//!
//! let state = ActionUtilsState::from_config(
//!     ActionUtilsConfig::default(),
//!     routes,
//!     FormRegistry::new(),
//!     (),
//! );
//! let app: axum::Router = axum::Router::new()
//!     .layer(state.session_layer())
//!     .with_state(state);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::config::ActionUtilsConfig;
use crate::forms::{FormFactory, FormRegistry};
use crate::middleware::SessionLayer;
use crate::routing::{RequestContext, RouteTable};
use crate::session::MemorySessionStore;
use crate::template::{MiniJinjaTemplates, TemplateEngine};

/// Application-wide collaborators, generic over the database registry
pub struct ActionUtilsState<R> {
    config: Arc<ActionUtilsConfig>,
    templates: Arc<dyn TemplateEngine>,
    forms: Arc<dyn FormFactory>,
    routes: Arc<RouteTable>,
    registry: Arc<R>,
    sessions: MemorySessionStore,
}

impl<R> Clone for ActionUtilsState<R> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            templates: Arc::clone(&self.templates),
            forms: Arc::clone(&self.forms),
            routes: Arc::clone(&self.routes),
            registry: Arc::clone(&self.registry),
            sessions: self.sessions.clone(),
        }
    }
}

impl<R> std::fmt::Debug for ActionUtilsState<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionUtilsState")
            .field("config", &self.config)
            .field("routes", &self.routes.len())
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}

impl<R> ActionUtilsState<R> {
    /// State from explicit collaborators
    #[must_use]
    pub fn new(
        config: ActionUtilsConfig,
        templates: Arc<dyn TemplateEngine>,
        forms: Arc<dyn FormFactory>,
        routes: Arc<RouteTable>,
        registry: R,
    ) -> Self {
        Self {
            config: Arc::new(config),
            templates,
            forms,
            routes,
            registry: Arc::new(registry),
            sessions: MemorySessionStore::new(),
        }
    }

    /// State with the bundled collaborators
    ///
    /// Templates load from `config.templates` and can call `path()` and
    /// `url()`; the route table's default context comes from
    /// `config.routing`.
    #[must_use]
    pub fn from_config(
        config: ActionUtilsConfig,
        mut routes: RouteTable,
        forms: FormRegistry,
        registry: R,
    ) -> Self {
        routes.set_context(RequestContext::from_settings(&config.routing));
        let routes = Arc::new(routes);
        let templates =
            MiniJinjaTemplates::new(&config.templates).with_routes(Arc::clone(&routes));

        tracing::debug!(
            template_dir = %config.templates.template_dir.display(),
            routes = routes.len(),
            "action utils state created"
        );

        Self::new(config, Arc::new(templates), Arc::new(forms), routes, registry)
    }

    /// Share an existing session store
    #[must_use]
    pub fn with_sessions(mut self, sessions: MemorySessionStore) -> Self {
        self.sessions = sessions;
        self
    }

    /// Configuration
    #[must_use]
    pub fn config(&self) -> &ActionUtilsConfig {
        &self.config
    }

    /// Template engine
    #[must_use]
    pub fn templates(&self) -> &Arc<dyn TemplateEngine> {
        &self.templates
    }

    /// Form factory
    #[must_use]
    pub fn forms(&self) -> &Arc<dyn FormFactory> {
        &self.forms
    }

    /// Route table
    #[must_use]
    pub const fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    /// Database registry
    #[must_use]
    pub const fn registry(&self) -> &Arc<R> {
        &self.registry
    }

    /// Session store
    #[must_use]
    pub const fn sessions(&self) -> &MemorySessionStore {
        &self.sessions
    }

    /// Session layer using this state's store and cookie settings
    #[must_use]
    pub fn session_layer(&self) -> SessionLayer {
        SessionLayer::with_settings(self.sessions.clone(), self.config.session.clone())
    }
}
