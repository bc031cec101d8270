//! Named routes and URL generation
//!
//! Routes are registered under a name with an axum-style path pattern
//! (`/posts/{id}`, `/files/{*path}`). A [`UrlGenerator`] turns a route name
//! plus [`Parameters`](crate::params::Parameters) back into a URL.
//!
//! # Example
//!
//! ```rust
//! use action_utils::params::Parameters;
//! use action_utils::routing::{ReferenceType, RouteTable, UrlGenerator};
//!
//! # fn example() -> Result<(), action_utils::routing::RoutingError> {
//! let mut routes = RouteTable::new();
//! routes.add("post_show", "/posts/{id}")?;
//!
//! let url = routes.generate(
//!     "post_show",
//!     &Parameters::new().with("id", 42).with("page", 2),
//!     ReferenceType::AbsolutePath,
//! )?;
//! assert_eq!(url, "/posts/42?page=2");
//! # Ok(())
//! # }
//! ```

mod context;
mod named;
mod table;

pub use context::RequestContext;
pub use named::NamedRouter;
pub use table::{Route, RouteTable, ScopedUrlGenerator};

use crate::params::Parameters;
use thiserror::Error;

/// Kind of URL to generate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReferenceType {
    /// `/base/path?query`
    #[default]
    AbsolutePath,
    /// `scheme://host[:port]/base/path?query`
    AbsoluteUrl,
    /// Path relative to the current request path, e.g. `../comments`
    RelativePath,
    /// `//host[:port]/base/path?query`
    NetworkPath,
}

/// URL generation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// No route registered under this name
    #[error("unable to generate a URL for the named route \"{0}\" as such route does not exist")]
    RouteNotFound(String),

    /// Required path variables were not supplied
    #[error("some mandatory parameters are missing ({}) to generate a URL for route \"{route}\"", .missing.join(", "))]
    MissingParameters {
        /// Route name
        route: String,
        /// Names of the missing variables
        missing: Vec<String>,
    },

    /// A path variable was given a value that cannot appear in a path
    #[error("parameter \"{parameter}\" for route \"{route}\" must be a scalar value")]
    InvalidParameter {
        /// Route name
        route: String,
        /// Parameter name
        parameter: String,
    },

    /// Path pattern could not be parsed
    #[error("invalid route pattern \"{pattern}\": {reason}")]
    InvalidPattern {
        /// Offending pattern
        pattern: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Generates URLs for named routes
#[cfg_attr(test, mockall::automock)]
pub trait UrlGenerator: Send + Sync {
    /// Generate a URL for `route`
    ///
    /// Parameters that are not path variables become the query string.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError`] if the route is unknown or a required
    /// variable is missing.
    fn generate(
        &self,
        route: &str,
        parameters: &Parameters,
        reference_type: ReferenceType,
    ) -> Result<String, RoutingError>;
}
