//! Axum router that records route names alongside handlers

use axum::{routing::MethodRouter, Router};

use super::{RouteTable, RoutingError};
use crate::params::Parameters;

/// Builds an axum [`Router`] and the matching [`RouteTable`] together
///
/// ```rust
/// use action_utils::routing::{NamedRouter, ReferenceType, UrlGenerator};
/// use action_utils::params::Parameters;
/// use axum::routing::get;
///
/// # fn example() -> Result<(), action_utils::routing::RoutingError> {
/// let (router, routes) = NamedRouter::<()>::new()
///     .route("home", "/", get(|| async { "home" }))?
///     .route("post_show", "/posts/{id}", get(|| async { "post" }))?
///     .into_parts();
///
/// let url = routes.generate("post_show", &Parameters::new().with("id", 1), ReferenceType::AbsolutePath)?;
/// assert_eq!(url, "/posts/1");
/// # let _ = router;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct NamedRouter<S = ()> {
    router: Router<S>,
    routes: RouteTable,
}

impl<S> Default for NamedRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> NamedRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Empty router and route table
    #[must_use]
    pub fn new() -> Self {
        Self::with_table(RouteTable::new())
    }

    /// Start from an existing table (e.g. one built from configuration)
    #[must_use]
    pub fn with_table(routes: RouteTable) -> Self {
        Self {
            router: Router::new(),
            routes,
        }
    }

    /// Register a handler under `path` and remember it as `name`
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::InvalidPattern`] if the path cannot be parsed.
    pub fn route(
        self,
        name: &str,
        path: &str,
        handler: MethodRouter<S>,
    ) -> Result<Self, RoutingError> {
        self.route_with_defaults(name, path, Parameters::new(), handler)
    }

    /// Like [`route`](Self::route), with default parameter values
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::InvalidPattern`] if the path cannot be parsed.
    pub fn route_with_defaults(
        mut self,
        name: &str,
        path: &str,
        defaults: Parameters,
        handler: MethodRouter<S>,
    ) -> Result<Self, RoutingError> {
        self.routes.add_with_defaults(name, path, defaults)?;
        self.router = self.router.route(path, handler);
        Ok(self)
    }

    /// Split into the axum router and the route table
    #[must_use]
    pub fn into_parts(self) -> (Router<S>, RouteTable) {
        (self.router, self.routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{ReferenceType, UrlGenerator};
    use axum::routing::get;

    #[test]
    fn test_names_are_recorded() {
        let (_router, routes) = NamedRouter::<()>::new()
            .route("home", "/", get(|| async { "home" }))
            .unwrap()
            .route_with_defaults(
                "list",
                "/list/{page}",
                Parameters::new().with("page", 1),
                get(|| async { "list" }),
            )
            .unwrap()
            .into_parts();

        assert_eq!(routes.len(), 2);
        assert_eq!(
            routes
                .generate("list", &Parameters::new(), ReferenceType::AbsolutePath)
                .unwrap(),
            "/list/1"
        );
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let result = NamedRouter::<()>::new().route("bad", "nope", get(|| async { "x" }));
        assert!(matches!(result, Err(RoutingError::InvalidPattern { .. })));
    }
}
