//! Route table and URL generation

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::{ReferenceType, RequestContext, RoutingError, UrlGenerator};
use crate::config::RoutingSettings;
use crate::params::Parameters;

/// Parameter name that becomes the URL fragment
const FRAGMENT_PARAMETER: &str = "_fragment";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Variable(String),
    Wildcard(String),
}

/// A named path pattern with optional default values
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    pattern: String,
    segments: Vec<Segment>,
    defaults: Parameters,
}

impl Route {
    /// Parse an axum-style pattern such as `/posts/{id}` or `/files/{*path}`
    ///
    /// `{{` and `}}` escape literal braces.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::InvalidPattern`] if the pattern does not start
    /// with `/`, has an unclosed or empty variable, or a stray `}`.
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Result<Self, RoutingError> {
        let pattern = pattern.into();
        let segments = parse_pattern(&pattern)?;
        Ok(Self {
            name: name.into(),
            pattern,
            segments,
            defaults: Parameters::new(),
        })
    }

    /// Attach default values for variables (and `_fragment`)
    #[must_use]
    pub fn with_defaults(mut self, defaults: Parameters) -> Self {
        self.defaults = defaults;
        self
    }

    /// Route name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Default values
    #[must_use]
    pub const fn defaults(&self) -> &Parameters {
        &self.defaults
    }

    /// Names of the path variables, in order
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Variable(name) | Segment::Wildcard(name) => Some(name.as_str()),
            Segment::Static(_) => None,
        })
    }

    fn is_variable(&self, name: &str) -> bool {
        self.variables().any(|v| v == name)
    }

    fn lookup<'a>(&'a self, name: &str, parameters: &'a Parameters) -> Option<&'a Value> {
        parameters
            .get(name)
            .filter(|v| !v.is_null())
            .or_else(|| self.defaults.get(name).filter(|v| !v.is_null()))
    }

    fn generate(
        &self,
        context: &RequestContext,
        parameters: &Parameters,
        reference_type: ReferenceType,
    ) -> Result<String, RoutingError> {
        let mut path = String::new();
        let mut missing = Vec::new();

        for segment in &self.segments {
            match segment {
                Segment::Static(text) => path.push_str(text),
                Segment::Variable(name) | Segment::Wildcard(name) => {
                    let Some(value) = self.lookup(name, parameters) else {
                        missing.push(name.clone());
                        continue;
                    };
                    let text =
                        scalar_to_string(value).ok_or_else(|| RoutingError::InvalidParameter {
                            route: self.name.clone(),
                            parameter: name.clone(),
                        })?;
                    if matches!(segment, Segment::Wildcard(_)) {
                        path.push_str(&encode_wildcard(&text));
                    } else {
                        if text.is_empty() {
                            return Err(RoutingError::InvalidParameter {
                                route: self.name.clone(),
                                parameter: name.clone(),
                            });
                        }
                        path.push_str(&encode_segment(&text));
                    }
                }
            }
        }

        if !missing.is_empty() {
            return Err(RoutingError::MissingParameters {
                route: self.name.clone(),
                missing,
            });
        }

        let mut query = Vec::new();
        let mut fragment = None;
        for (key, value) in parameters {
            if self.is_variable(key) {
                continue;
            }
            if key == FRAGMENT_PARAMETER {
                fragment = scalar_to_string(value);
                continue;
            }
            if self.defaults.get(key) == Some(value) {
                continue;
            }
            append_query(&mut query, key, value);
        }
        if fragment.is_none() {
            fragment = self.defaults.get(FRAGMENT_PARAMETER).and_then(scalar_to_string);
        }

        let full_path = format!("{}{path}", context.base_url);
        let mut url = match reference_type {
            ReferenceType::AbsolutePath => full_path,
            ReferenceType::AbsoluteUrl => {
                format!("{}://{}{full_path}", context.scheme, context.authority())
            }
            ReferenceType::NetworkPath => format!("//{}{full_path}", context.authority()),
            ReferenceType::RelativePath => relative_path(
                &format!("{}{}", context.base_url, context.path_info),
                &full_path,
            ),
        };

        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }
        if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
            url.push('#');
            url.push_str(&urlencoding::encode(&fragment));
        }

        Ok(url)
    }
}

/// Named routes plus the default request context
///
/// Registering a name twice replaces the earlier route.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, Route>,
    context: RequestContext,
}

impl RouteTable {
    /// Empty table with the default context (`http://localhost`)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty table using the configured host, scheme and base URL
    #[must_use]
    pub fn from_settings(settings: &RoutingSettings) -> Self {
        Self {
            routes: HashMap::new(),
            context: RequestContext::from_settings(settings),
        }
    }

    /// Register a route
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::InvalidPattern`] if the pattern cannot be parsed.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Result<&mut Self, RoutingError> {
        self.insert(Route::new(name, pattern)?);
        Ok(self)
    }

    /// Register a route with default values
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::InvalidPattern`] if the pattern cannot be parsed.
    pub fn add_with_defaults(
        &mut self,
        name: impl Into<String>,
        pattern: impl Into<String>,
        defaults: Parameters,
    ) -> Result<&mut Self, RoutingError> {
        self.insert(Route::new(name, pattern)?.with_defaults(defaults));
        Ok(self)
    }

    /// Register an already parsed route
    pub fn insert(&mut self, route: Route) -> &mut Self {
        if let Some(previous) = self.routes.insert(route.name.clone(), route) {
            tracing::debug!(route = %previous.name, pattern = %previous.pattern, "route replaced");
        }
        self
    }

    /// Look up a route
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.get(name)
    }

    /// Whether a route is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.routes.contains_key(name)
    }

    /// Number of routes
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered route names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// Default request context
    #[must_use]
    pub const fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Replace the default request context
    pub fn set_context(&mut self, context: RequestContext) {
        self.context = context;
    }

    /// Generate a URL against an explicit request context
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError`] if the route is unknown, a variable is
    /// missing, or a variable value is not a scalar.
    pub fn generate_with_context(
        &self,
        context: &RequestContext,
        route: &str,
        parameters: &Parameters,
        reference_type: ReferenceType,
    ) -> Result<String, RoutingError> {
        self.routes
            .get(route)
            .ok_or_else(|| RoutingError::RouteNotFound(route.to_string()))?
            .generate(context, parameters, reference_type)
    }

    /// Bind the table to a request context
    #[must_use]
    pub fn scoped(self: &Arc<Self>, context: RequestContext) -> ScopedUrlGenerator {
        ScopedUrlGenerator {
            routes: Arc::clone(self),
            context,
        }
    }
}

impl UrlGenerator for RouteTable {
    fn generate(
        &self,
        route: &str,
        parameters: &Parameters,
        reference_type: ReferenceType,
    ) -> Result<String, RoutingError> {
        self.generate_with_context(&self.context, route, parameters, reference_type)
    }
}

/// A shared route table bound to one request's context
#[derive(Debug, Clone)]
pub struct ScopedUrlGenerator {
    routes: Arc<RouteTable>,
    context: RequestContext,
}

impl ScopedUrlGenerator {
    /// The bound context
    #[must_use]
    pub const fn context(&self) -> &RequestContext {
        &self.context
    }
}

impl UrlGenerator for ScopedUrlGenerator {
    fn generate(
        &self,
        route: &str,
        parameters: &Parameters,
        reference_type: ReferenceType,
    ) -> Result<String, RoutingError> {
        self.routes
            .generate_with_context(&self.context, route, parameters, reference_type)
    }
}

fn parse_pattern(pattern: &str) -> Result<Vec<Segment>, RoutingError> {
    let invalid = |reason: &str| RoutingError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    };

    if !pattern.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }

    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '}' => return Err(invalid("unmatched '}'")),
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if !closed {
                    return Err(invalid("unclosed '{'"));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Static(std::mem::take(&mut literal)));
                }
                match name.strip_prefix('*') {
                    Some("") => return Err(invalid("empty wildcard name")),
                    Some(rest) => segments.push(Segment::Wildcard(rest.to_string())),
                    None if name.is_empty() => return Err(invalid("empty variable name")),
                    None => segments.push(Segment::Variable(name)),
                }
            }
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Static(literal));
    }
    Ok(segments)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// One path segment; `.` and `..` are encoded so the generated path cannot
/// climb out of the route.
fn encode_segment(value: &str) -> String {
    match value {
        "." => "%2E".to_string(),
        ".." => "%2E%2E".to_string(),
        other => urlencoding::encode(other).into_owned(),
    }
}

/// Wildcards keep their `/` separators
fn encode_wildcard(value: &str) -> String {
    value
        .split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

/// Flatten a value into `key=value` pairs the way HTML forms nest them:
/// arrays as `key[0]`, objects as `key[name]`, nulls dropped.
fn append_query(pairs: &mut Vec<String>, key: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                append_query(pairs, &format!("{key}[{index}]"), item);
            }
        }
        Value::Object(map) => {
            for (name, item) in map {
                append_query(pairs, &format!("{key}[{name}]"), item);
            }
        }
        scalar => {
            if let Some(text) = scalar_to_string(scalar) {
                pairs.push(format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(&text)
                ));
            }
        }
    }
}

/// Path from `base` to `target`, both absolute
fn relative_path(base: &str, target: &str) -> String {
    if base == target {
        return String::new();
    }

    let mut source_dirs: Vec<&str> = base.strip_prefix('/').unwrap_or(base).split('/').collect();
    let mut target_dirs: Vec<&str> = target
        .strip_prefix('/')
        .unwrap_or(target)
        .split('/')
        .collect();
    source_dirs.pop();
    let target_file = target_dirs.pop().unwrap_or_default();

    let common = source_dirs
        .iter()
        .zip(&target_dirs)
        .take_while(|(a, b)| a == b)
        .count();

    let mut remaining = target_dirs.split_off(common);
    remaining.push(target_file);
    let path = format!(
        "{}{}",
        "../".repeat(source_dirs.len() - common),
        remaining.join("/")
    );

    // A leading colon segment would read as a scheme.
    let colon_before_slash = path
        .find(':')
        .is_some_and(|colon| path.find('/').is_none_or(|slash| colon < slash));
    if path.is_empty() || path.starts_with('/') || colon_before_slash {
        format!("./{path}")
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> RouteTable {
        let mut routes = RouteTable::new();
        routes
            .add("home", "/")
            .unwrap()
            .add("post_show", "/posts/{id}")
            .unwrap()
            .add("comment", "/posts/{post}/comments/{comment}")
            .unwrap()
            .add("files", "/files/{*path}")
            .unwrap()
            .add_with_defaults(
                "blog",
                "/blog/{page}",
                Parameters::new().with("page", 1).with("_fragment", "top"),
            )
            .unwrap();
        routes
    }

    fn path(routes: &RouteTable, name: &str, params: &Parameters) -> Result<String, RoutingError> {
        routes.generate(name, params, ReferenceType::AbsolutePath)
    }

    #[test]
    fn test_parse_pattern() {
        let route = Route::new("r", "/a/{b}/c/{*d}").unwrap();
        assert_eq!(route.variables().collect::<Vec<_>>(), vec!["b", "d"]);
        assert_eq!(route.pattern(), "/a/{b}/c/{*d}");
    }

    #[test]
    fn test_parse_pattern_errors() {
        assert!(Route::new("r", "no-slash").is_err());
        assert!(Route::new("r", "/{open").is_err());
        assert!(Route::new("r", "/{}").is_err());
        assert!(Route::new("r", "/{*}").is_err());
        assert!(Route::new("r", "/stray}").is_err());
    }

    #[test]
    fn test_escaped_braces_are_literal() {
        let mut routes = RouteTable::new();
        routes.add("raw", "/{{literal}}").unwrap();
        assert_eq!(path(&routes, "raw", &Parameters::new()).unwrap(), "/{literal}");
    }

    #[test]
    fn test_static_route() {
        assert_eq!(path(&table(), "home", &Parameters::new()).unwrap(), "/");
    }

    #[test]
    fn test_variables_are_substituted_and_encoded() {
        let routes = table();
        assert_eq!(
            path(&routes, "post_show", &Parameters::new().with("id", 42)).unwrap(),
            "/posts/42"
        );
        assert_eq!(
            path(&routes, "post_show", &Parameters::new().with("id", "a b/c")).unwrap(),
            "/posts/a%20b%2Fc"
        );
    }

    #[test]
    fn test_wildcard_keeps_slashes() {
        let routes = table();
        assert_eq!(
            path(&routes, "files", &Parameters::new().with("path", "docs/read me.txt")).unwrap(),
            "/files/docs/read%20me.txt"
        );
        assert_eq!(
            path(&routes, "files", &Parameters::new().with("path", "../etc")).unwrap(),
            "/files/%2E%2E/etc"
        );
    }

    #[test]
    fn test_unknown_route() {
        assert_eq!(
            path(&table(), "nope", &Parameters::new()),
            Err(RoutingError::RouteNotFound("nope".into()))
        );
    }

    #[test]
    fn test_missing_parameters_are_all_reported() {
        let err = path(&table(), "comment", &Parameters::new()).unwrap_err();
        assert_eq!(
            err,
            RoutingError::MissingParameters {
                route: "comment".into(),
                missing: vec!["post".into(), "comment".into()],
            }
        );
        assert!(err.to_string().contains("post, comment"));
    }

    #[test]
    fn test_null_counts_as_missing() {
        let err = path(&table(), "post_show", &Parameters::new().with("id", Value::Null));
        assert!(matches!(err, Err(RoutingError::MissingParameters { .. })));
    }

    #[test]
    fn test_non_scalar_variable_is_rejected() {
        let err = path(&table(), "post_show", &Parameters::new().with("id", json!([1, 2])));
        assert!(matches!(err, Err(RoutingError::InvalidParameter { .. })));
    }

    #[test]
    fn test_dot_segments_in_variables_are_encoded() {
        assert_eq!(
            path(&table(), "post_show", &Parameters::new().with("id", "..")).unwrap(),
            "/posts/%2E%2E"
        );
        assert_eq!(
            path(&table(), "post_show", &Parameters::new().with("id", ".")).unwrap(),
            "/posts/%2E"
        );
        assert_eq!(
            path(&table(), "post_show", &Parameters::new().with("id", "v1.2")).unwrap(),
            "/posts/v1.2"
        );
    }

    #[test]
    fn test_empty_variable_is_rejected() {
        let err = path(&table(), "post_show", &Parameters::new().with("id", ""));
        assert_eq!(
            err,
            Err(RoutingError::InvalidParameter {
                route: "post_show".into(),
                parameter: "id".into(),
            })
        );
    }

    #[test]
    fn test_extra_parameters_become_query() {
        let params = Parameters::new()
            .with("id", 1)
            .with("page", 2)
            .with("q", "rust & axum");
        assert_eq!(
            path(&table(), "post_show", &params).unwrap(),
            "/posts/1?page=2&q=rust%20%26%20axum"
        );
    }

    #[test]
    fn test_nested_query_values() {
        let params = Parameters::new()
            .with("tags", json!(["a", "b"]))
            .with("skip", Value::Null)
            .with("active", true);
        assert_eq!(
            path(&table(), "home", &params).unwrap(),
            "/?active=1&tags%5B0%5D=a&tags%5B1%5D=b"
        );
    }

    #[test]
    fn test_defaults_fill_variables_and_fragment() {
        let routes = table();
        assert_eq!(path(&routes, "blog", &Parameters::new()).unwrap(), "/blog/1#top");
        assert_eq!(
            path(&routes, "blog", &Parameters::new().with("page", 3).with("_fragment", "c2"))
                .unwrap(),
            "/blog/3#c2"
        );
    }

    #[test]
    fn test_absolute_url_and_network_path() {
        let mut routes = table();
        routes.set_context(RequestContext {
            scheme: "https".into(),
            host: "example.com".into(),
            https_port: 8443,
            base_url: "/app".into(),
            ..RequestContext::default()
        });
        let params = Parameters::new().with("id", 5);

        assert_eq!(
            routes
                .generate("post_show", &params, ReferenceType::AbsoluteUrl)
                .unwrap(),
            "https://example.com:8443/app/posts/5"
        );
        assert_eq!(
            routes
                .generate("post_show", &params, ReferenceType::NetworkPath)
                .unwrap(),
            "//example.com:8443/app/posts/5"
        );
        assert_eq!(
            routes
                .generate("post_show", &params, ReferenceType::AbsolutePath)
                .unwrap(),
            "/app/posts/5"
        );
    }

    #[test]
    fn test_relative_path_generation() {
        let routes = Arc::new(table());
        let scoped = routes.scoped(RequestContext {
            path_info: "/posts/1".into(),
            ..RequestContext::default()
        });

        let relative = |name: &str, params: Parameters| {
            scoped
                .generate(name, &params, ReferenceType::RelativePath)
                .unwrap()
        };

        assert_eq!(relative("post_show", Parameters::new().with("id", 2)), "2");
        assert_eq!(relative("post_show", Parameters::new().with("id", 1)), "");
        assert_eq!(relative("home", Parameters::new()), "../");
        assert_eq!(
            relative("comment", Parameters::new().with("post", 1).with("comment", 9)),
            "1/comments/9"
        );
    }

    #[test]
    fn test_relative_path_helper() {
        assert_eq!(relative_path("/a/b/c/d", "/a/b/c/d"), "");
        assert_eq!(relative_path("/a/b/c/d", "/a/b/c/"), "./");
        assert_eq!(relative_path("/a/b/c/d", "/a/b/"), "../");
        assert_eq!(relative_path("/a/b/c/d", "/a/b/c/other"), "other");
        assert_eq!(relative_path("/a/b/c/d", "/a/x/y"), "../../x/y");
        assert_eq!(relative_path("/a/b/c/d", "/"), "../../../");
        assert_eq!(relative_path("/", "/a:b"), "./a:b");
    }
}
