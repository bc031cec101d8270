//! Request context for URL generation

use http::{header::HOST, request::Parts};

use crate::config::RoutingSettings;

/// Header set by reverse proxies with the original scheme
const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Where the current request came in
///
/// Absolute and network URLs use the scheme, host and port; relative URLs
/// are computed against `base_url + path_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// `http` or `https`
    pub scheme: String,
    /// Host name without port
    pub host: String,
    /// Port for `http` URLs
    pub http_port: u16,
    /// Port for `https` URLs
    pub https_port: u16,
    /// Mount prefix, no trailing slash
    pub base_url: String,
    /// Path of the current request below `base_url`
    pub path_info: String,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::from_settings(&RoutingSettings::default())
    }
}

impl RequestContext {
    /// Context from configuration, with `/` as the current path
    #[must_use]
    pub fn from_settings(settings: &RoutingSettings) -> Self {
        Self {
            scheme: settings.scheme.to_ascii_lowercase(),
            host: settings.host.clone(),
            http_port: settings.http_port,
            https_port: settings.https_port,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            path_info: "/".to_string(),
        }
    }

    /// Context for an incoming request
    ///
    /// Host and port come from the `Host` header, scheme from the first
    /// `X-Forwarded-Proto` entry; anything missing or other than `http` and
    /// `https` falls back to `defaults`. The request path has
    /// `defaults.base_url` stripped when it starts with it.
    #[must_use]
    pub fn from_parts(parts: &Parts, defaults: &Self) -> Self {
        let mut context = defaults.clone();

        if let Some(scheme) = forwarded_scheme(parts) {
            context.scheme = scheme;
        } else if let Some(scheme) = parts.uri.scheme_str().and_then(known_scheme) {
            context.scheme = scheme;
        }

        let authority = parts
            .headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| parts.uri.authority().map(ToString::to_string));
        if let Some(authority) = authority {
            let host_port = authority.rsplit_once(':').and_then(|(host, port)| {
                port.parse::<u16>().ok().map(|port| (host.to_string(), port))
            });
            match host_port {
                Some((host, port)) => {
                    context.host = host;
                    if context.scheme == "https" {
                        context.https_port = port;
                    } else {
                        context.http_port = port;
                    }
                }
                None => context.host = authority,
            }
        }

        let path = parts.uri.path();
        context.path_info = path
            .strip_prefix(context.base_url.as_str())
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .map_or_else(|| path.to_string(), str::to_string);
        if context.path_info.is_empty() {
            context.path_info = "/".to_string();
        }

        context
    }

    /// Port to use for the current scheme
    #[must_use]
    pub fn port(&self) -> u16 {
        if self.scheme == "https" {
            self.https_port
        } else {
            self.http_port
        }
    }

    /// `host[:port]`, omitting the default port for the scheme
    #[must_use]
    pub fn authority(&self) -> String {
        let port = self.port();
        let default_port = if self.scheme == "https" { 443 } else { 80 };
        if port == default_port {
            self.host.clone()
        } else {
            format!("{}:{port}", self.host)
        }
    }
}

/// Scheme from the client-side end of an `X-Forwarded-Proto` chain
fn forwarded_scheme(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(FORWARDED_PROTO)?.to_str().ok()?;
    let first = value.split(',').next()?;
    let scheme = known_scheme(first);
    if scheme.is_none() {
        tracing::debug!(header = %value, "ignoring unsupported forwarded scheme");
    }
    scheme
}

fn known_scheme(value: &str) -> Option<String> {
    let scheme = value.trim().to_ascii_lowercase();
    matches!(scheme.as_str(), "http" | "https").then_some(scheme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request;

    fn request_parts(request: Request<()>) -> Parts {
        request.into_parts().0
    }

    #[test]
    fn test_default_context() {
        let context = RequestContext::default();
        assert_eq!(context.scheme, "http");
        assert_eq!(context.authority(), "localhost");
        assert_eq!(context.path_info, "/");
    }

    #[test]
    fn test_from_parts_reads_host_and_port() {
        let parts = request_parts(
            Request::builder()
                .uri("/posts/1")
                .header(HOST, "example.com:8080")
                .body(())
                .unwrap(),
        );
        let context = RequestContext::from_parts(&parts, &RequestContext::default());
        assert_eq!(context.host, "example.com");
        assert_eq!(context.http_port, 8080);
        assert_eq!(context.authority(), "example.com:8080");
        assert_eq!(context.path_info, "/posts/1");
    }

    #[test]
    fn test_from_parts_honours_forwarded_proto() {
        let parts = request_parts(
            Request::builder()
                .uri("/")
                .header(HOST, "secure.example.com")
                .header(FORWARDED_PROTO, "HTTPS")
                .body(())
                .unwrap(),
        );
        let context = RequestContext::from_parts(&parts, &RequestContext::default());
        assert_eq!(context.scheme, "https");
        assert_eq!(context.authority(), "secure.example.com");
    }

    #[test]
    fn test_forwarded_proto_chain_uses_first_entry() {
        let parts = request_parts(
            Request::builder()
                .uri("/")
                .header(HOST, "example.com")
                .header(FORWARDED_PROTO, " https , http")
                .body(())
                .unwrap(),
        );
        let context = RequestContext::from_parts(&parts, &RequestContext::default());
        assert_eq!(context.scheme, "https");
    }

    #[test]
    fn test_unknown_forwarded_proto_falls_back() {
        for proto in ["javascript", "", "ftp, https"] {
            let parts = request_parts(
                Request::builder()
                    .uri("/")
                    .header(HOST, "example.com")
                    .header(FORWARDED_PROTO, proto)
                    .body(())
                    .unwrap(),
            );
            let context = RequestContext::from_parts(&parts, &RequestContext::default());
            assert_eq!(context.scheme, "http", "proto {proto:?}");
        }
    }

    #[test]
    fn test_from_parts_strips_base_url() {
        let defaults = RequestContext {
            base_url: "/app".into(),
            ..RequestContext::default()
        };
        let parts = request_parts(Request::builder().uri("/app/blog/3").body(()).unwrap());
        let context = RequestContext::from_parts(&parts, &defaults);
        assert_eq!(context.path_info, "/blog/3");

        let parts = request_parts(Request::builder().uri("/application").body(()).unwrap());
        let context = RequestContext::from_parts(&parts, &defaults);
        assert_eq!(context.path_info, "/application");
    }
}
