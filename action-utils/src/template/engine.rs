//! minijinja-backed template engine with directory loading and reload

use minijinja::{Environment, ErrorKind, UndefinedBehavior, Value};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use super::{TemplateEngine, TemplateError};
use crate::config::TemplateSettings;
use crate::params::Parameters;
use crate::routing::{ReferenceType, RouteTable, UrlGenerator};

/// Thread-safe minijinja environment
///
/// Templates are resolved from the in-memory set first, then from the
/// template directory. [`reload`](Self::reload) rebuilds the environment
/// and swaps it atomically, dropping every cached file template.
#[derive(Debug)]
pub struct MiniJinjaTemplates {
    env: RwLock<Environment<'static>>,
    template_dir: Option<PathBuf>,
    strict_variables: bool,
    trim_blocks: bool,
    inline: RwLock<BTreeMap<String, String>>,
    routes: Option<Arc<RouteTable>>,
}

impl MiniJinjaTemplates {
    /// Create an engine loading from `settings.template_dir`
    ///
    /// The directory is read lazily, so a missing directory only surfaces
    /// as [`TemplateError::NotFound`] at render time.
    #[must_use]
    pub fn new(settings: &TemplateSettings) -> Self {
        Self::build(
            Some(settings.template_dir.clone()),
            settings.strict_variables,
            settings.trim_blocks,
        )
    }

    /// Create an engine without a template directory
    #[must_use]
    pub fn in_memory() -> Self {
        Self::build(None, false, true)
    }

    fn build(template_dir: Option<PathBuf>, strict_variables: bool, trim_blocks: bool) -> Self {
        let env = create_environment(template_dir.as_ref(), strict_variables, trim_blocks, None);
        Self {
            env: RwLock::new(env),
            template_dir,
            strict_variables,
            trim_blocks,
            inline: RwLock::new(BTreeMap::new()),
            routes: None,
        }
    }

    /// Fail on undefined variables
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict_variables = true;
        self.rebuild();
        self
    }

    /// Expose `path(name, params)` and `url(name, params)` to templates
    ///
    /// Both generate against the table's configured
    /// [`RequestContext`](crate::routing::RequestContext), not the incoming
    /// request's, so `url()` always uses the configured scheme, host and
    /// port. Handlers that need request-scoped URLs pass them in as
    /// parameters built with `generate_url`.
    #[must_use]
    pub fn with_routes(mut self, routes: Arc<RouteTable>) -> Self {
        self.routes = Some(routes);
        self.rebuild();
        self
    }

    fn rebuild(&mut self) {
        let mut env = create_environment(
            self.template_dir.as_ref(),
            self.strict_variables,
            self.trim_blocks,
            self.routes.as_ref(),
        );
        for (name, source) in self.inline.read().iter() {
            if let Err(err) = env.add_template_owned(name.clone(), source.clone()) {
                tracing::warn!(
                    template = %name,
                    error = %err,
                    "in-memory template dropped on rebuild"
                );
            }
        }
        *self.env.get_mut() = env;
    }

    /// Register a template from a string
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Syntax`] if the source does not parse.
    pub fn add_template(
        &self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<(), TemplateError> {
        let name = name.into();
        let source = source.into();
        self.env
            .write()
            .add_template_owned(name.clone(), source.clone())?;
        self.inline.write().insert(name, source);
        Ok(())
    }

    /// Reload every template
    ///
    /// # Errors
    ///
    /// Returns an error if an in-memory template no longer parses.
    pub fn reload(&self) -> Result<(), TemplateError> {
        let mut env = create_environment(
            self.template_dir.as_ref(),
            self.strict_variables,
            self.trim_blocks,
            self.routes.as_ref(),
        );
        for (name, source) in self.inline.read().iter() {
            env.add_template_owned(name.clone(), source.clone())?;
        }

        *self.env.write() = env;

        tracing::debug!(dir = ?self.template_dir, "templates reloaded");
        Ok(())
    }

    /// Template directory, if any
    #[must_use]
    pub const fn template_dir(&self) -> Option<&PathBuf> {
        self.template_dir.as_ref()
    }
}

impl TemplateEngine for MiniJinjaTemplates {
    fn render(&self, name: &str, parameters: &Parameters) -> Result<String, TemplateError> {
        let env = self.env.read();
        let template = env.get_template(name).map_err(|err| {
            if err.kind() == ErrorKind::TemplateNotFound {
                TemplateError::NotFound(name.to_string())
            } else {
                err.into()
            }
        })?;
        template.render(parameters).map_err(Into::into)
    }

    fn exists(&self, name: &str) -> bool {
        self.env.read().get_template(name).is_ok()
    }
}

fn create_environment(
    template_dir: Option<&PathBuf>,
    strict_variables: bool,
    trim_blocks: bool,
    routes: Option<&Arc<RouteTable>>,
) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_trim_blocks(trim_blocks);
    env.set_lstrip_blocks(trim_blocks);
    if strict_variables {
        env.set_undefined_behavior(UndefinedBehavior::Strict);
    }
    if let Some(dir) = template_dir {
        env.set_loader(minijinja::path_loader(dir));
    }
    // Route functions are bound to the table's default context.
    if let Some(routes) = routes {
        let table = Arc::clone(routes);
        env.add_function("path", move |name: String, params: Option<Value>| {
            generate(&table, &name, params, ReferenceType::AbsolutePath)
        });
        let table = Arc::clone(routes);
        env.add_function("url", move |name: String, params: Option<Value>| {
            generate(&table, &name, params, ReferenceType::AbsoluteUrl)
        });
    }
    env
}

fn generate(
    routes: &RouteTable,
    name: &str,
    params: Option<Value>,
    reference_type: ReferenceType,
) -> Result<Value, minijinja::Error> {
    let parameters = match params {
        Some(value) => Parameters::from_serialize(&value)
            .map_err(|e| minijinja::Error::new(ErrorKind::InvalidOperation, e.to_string()))?,
        None => Parameters::new(),
    };
    routes
        .generate(name, &parameters, reference_type)
        .map(Value::from_safe_string)
        .map_err(|e| minijinja::Error::new(ErrorKind::InvalidOperation, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RequestContext;
    use std::fs;

    #[test]
    fn test_render_in_memory_template() {
        let templates = MiniJinjaTemplates::in_memory();
        templates
            .add_template("greet.html", "<h1>{{ title }}</h1>")
            .unwrap();

        let html = templates
            .render("greet.html", &Parameters::new().with("title", "Welcome"))
            .unwrap();
        assert_eq!(html, "<h1>Welcome</h1>");
    }

    #[test]
    fn test_html_templates_are_autoescaped() {
        let templates = MiniJinjaTemplates::in_memory();
        templates.add_template("x.html", "{{ v }}").unwrap();

        let html = templates
            .render("x.html", &Parameters::new().with("v", "<script>"))
            .unwrap();
        assert_eq!(html, "&lt;script&gt;");
    }

    #[test]
    fn test_missing_template() {
        let templates = MiniJinjaTemplates::in_memory();
        let err = templates.render("missing.html", &Parameters::new()).unwrap_err();
        assert_eq!(err, TemplateError::NotFound("missing.html".into()));
        assert!(!templates.exists("missing.html"));
    }

    #[test]
    fn test_syntax_error_on_add() {
        let templates = MiniJinjaTemplates::in_memory();
        let err = templates.add_template("bad.html", "{% for %}").unwrap_err();
        assert!(matches!(err, TemplateError::Syntax(_)));
    }

    #[test]
    fn test_strict_undefined_is_render_error() {
        let templates = MiniJinjaTemplates::in_memory().strict();
        templates.add_template("strict.html", "{{ nothing }}").unwrap();

        let err = templates.render("strict.html", &Parameters::new()).unwrap_err();
        assert!(matches!(err, TemplateError::Render(_)));
    }

    #[test]
    fn test_loads_from_directory_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("page.html"), "v1 {{ n }}").unwrap();

        let settings = TemplateSettings {
            template_dir: dir.path().to_path_buf(),
            ..TemplateSettings::default()
        };
        let templates = MiniJinjaTemplates::new(&settings);
        let params = Parameters::new().with("n", 1);

        assert!(templates.exists("page.html"));
        assert_eq!(templates.render("page.html", &params).unwrap(), "v1 1");

        fs::write(dir.path().join("page.html"), "v2 {{ n }}").unwrap();
        templates.reload().unwrap();
        assert_eq!(templates.render("page.html", &params).unwrap(), "v2 1");
    }

    #[test]
    fn test_inline_templates_survive_reload() {
        let templates = MiniJinjaTemplates::in_memory();
        templates.add_template("a.html", "A").unwrap();
        templates.reload().unwrap();
        assert_eq!(templates.render("a.html", &Parameters::new()).unwrap(), "A");
    }

    #[test]
    fn test_route_functions() {
        let mut routes = RouteTable::new();
        routes.add("home", "/").unwrap();
        routes.add("post_show", "/posts/{id}").unwrap();

        let templates = MiniJinjaTemplates::in_memory().with_routes(Arc::new(routes));
        templates
            .add_template(
                "links.html",
                "{{ path('post_show', {'id': 5}) }} {{ url('home') }}",
            )
            .unwrap();

        let html = templates.render("links.html", &Parameters::new()).unwrap();
        assert_eq!(html, "/posts/5 http://localhost/");
    }

    #[test]
    fn test_route_functions_use_configured_context() {
        let mut routes = RouteTable::new();
        routes.add("home", "/").unwrap();
        routes.set_context(RequestContext {
            scheme: "https".into(),
            host: "blog.example.com".into(),
            base_url: "/app".into(),
            ..RequestContext::default()
        });

        let templates = MiniJinjaTemplates::in_memory().with_routes(Arc::new(routes));
        templates.add_template("home.html", "{{ url('home') }}").unwrap();

        let html = templates.render("home.html", &Parameters::new()).unwrap();
        assert_eq!(html, "https://blog.example.com/app/");
    }

    #[test]
    fn test_inline_templates_survive_builder_rebuilds() {
        let templates = MiniJinjaTemplates::in_memory();
        templates.add_template("a.html", "{{ a }}").unwrap();

        let templates = templates.with_routes(Arc::new(RouteTable::new())).strict();
        assert_eq!(
            templates.render("a.html", &Parameters::new().with("a", 1)).unwrap(),
            "1"
        );
        assert!(templates.render("a.html", &Parameters::new()).is_err());
    }

    #[test]
    fn test_route_function_errors_surface_as_render_errors() {
        let templates =
            MiniJinjaTemplates::in_memory().with_routes(Arc::new(RouteTable::new()));
        templates.add_template("bad.html", "{{ path('nope') }}").unwrap();

        let err = templates.render("bad.html", &Parameters::new()).unwrap_err();
        assert!(matches!(err, TemplateError::Render(_)));
    }
}
