//! Template rendering
//!
//! [`TemplateEngine`] is the seam the controller helpers render through.
//! [`MiniJinjaTemplates`] is the bundled implementation: a minijinja
//! environment that loads templates from a directory, accepts in-memory
//! templates, and can expose `path()`/`url()` functions backed by the
//! route table. Those functions use the table's configured request context;
//! request-scoped URLs come from `ActionUtils::generate_url`.
//!
//! # Example
//!
//! ```rust
//! use action_utils::params::Parameters;
//! use action_utils::template::{MiniJinjaTemplates, TemplateEngine};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let templates = MiniJinjaTemplates::in_memory();
//! templates.add_template("hello.html", "Hello {{ name }}!")?;
//!
//! let html = templates.render("hello.html", &Parameters::new().with("name", "Ada"))?;
//! assert_eq!(html, "Hello Ada!");
//! # Ok(())
//! # }
//! ```

mod engine;

pub use engine::MiniJinjaTemplates;

use crate::params::Parameters;
use thiserror::Error;

/// Errors raised by a template engine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Template does not exist
    #[error("template not found: {0}")]
    NotFound(String),

    /// Template source could not be parsed
    #[error("template syntax error: {0}")]
    Syntax(String),

    /// Rendering failed at runtime
    #[error("template render error: {0}")]
    Render(String),
}

impl From<minijinja::Error> for TemplateError {
    fn from(err: minijinja::Error) -> Self {
        match err.kind() {
            minijinja::ErrorKind::TemplateNotFound => {
                Self::NotFound(err.detail().map_or_else(|| err.to_string(), str::to_string))
            }
            minijinja::ErrorKind::SyntaxError => Self::Syntax(err.to_string()),
            _ => Self::Render(err.to_string()),
        }
    }
}

/// Renders named templates with a parameter map
#[cfg_attr(test, mockall::automock)]
pub trait TemplateEngine: Send + Sync {
    /// Render template `name` with `parameters` as its context
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if the template is missing, does not parse,
    /// or fails while rendering.
    fn render(&self, name: &str, parameters: &Parameters) -> Result<String, TemplateError>;

    /// Whether a template with this name can be loaded
    fn exists(&self, name: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_template_maps_to_not_found() {
        let env = minijinja::Environment::new();
        let err = env.get_template("nope.html").unwrap_err();
        assert!(matches!(TemplateError::from(err), TemplateError::NotFound(_)));
    }

    #[test]
    fn test_syntax_error_maps_to_syntax() {
        let mut env = minijinja::Environment::new();
        let err = env.add_template("broken.html", "{% if %}").unwrap_err();
        assert!(matches!(TemplateError::from(err), TemplateError::Syntax(_)));
    }
}
