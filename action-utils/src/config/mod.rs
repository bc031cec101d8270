//! Configuration management for action-utils
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `ACTION_UTILS_` prefix, `__` for nesting)
//! 2. `./config.toml` (development)
//! 3. `~/.config/action-utils/{service}/config.toml` (user config, XDG)
//! 4. `/etc/action-utils/{service}/config.toml` (system config)
//! 5. Hardcoded defaults (fallback)
//!
//! Environment variable format: `ACTION_UTILS_SECTION__FIELD_NAME`, for
//! example `ACTION_UTILS_ROUTING__HOST=example.com`.
//!
//! # Example Configuration
//!
//! ```toml
//! [templates]
//! template_dir = "./templates"
//! strict_variables = true
//!
//! [routing]
//! scheme = "https"
//! host = "example.com"
//! base_url = "/app"
//!
//! [session]
//! cookie_name = "action_session"
//! max_age_secs = 86400
//!
//! [database]
//! default_connection = "default"
//!
//! [database.connections.default]
//! url = "postgres://localhost/app"
//! max_connections = 10
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "ACTION_UTILS_";

/// Template engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Directory templates are loaded from
    pub template_dir: PathBuf,

    /// Fail rendering when a template reads an undefined variable
    pub strict_variables: bool,

    /// Trim the first newline after a block tag
    pub trim_blocks: bool,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("./templates"),
            strict_variables: false,
            trim_blocks: true,
        }
    }
}

/// Default request context used for URL generation outside a request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingSettings {
    /// URL scheme (`http` or `https`)
    pub scheme: String,

    /// Host name
    pub host: String,

    /// Port used for `http` URLs
    pub http_port: u16,

    /// Port used for `https` URLs
    pub https_port: u16,

    /// Path prefix the application is mounted under (no trailing slash)
    pub base_url: String,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            http_port: 80,
            https_port: 443,
            base_url: String::new(),
        }
    }
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Cookie name for the session ID
    pub cookie_name: String,

    /// Cookie path
    pub cookie_path: String,

    /// HTTP-only cookie
    pub http_only: bool,

    /// Secure cookie (HTTPS only)
    pub secure: bool,

    /// Cookie `SameSite` policy
    pub same_site: SameSitePolicy,

    /// Session lifetime in seconds
    pub max_age_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: "action_session".to_string(),
            cookie_path: "/".to_string(),
            http_only: true,
            secure: !cfg!(debug_assertions),
            same_site: SameSitePolicy::Lax,
            max_age_secs: 86400, // 24 hours
        }
    }
}

/// Cookie `SameSite` policy
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    /// Strict `SameSite` policy
    Strict,
    /// Lax `SameSite` policy (recommended)
    #[default]
    Lax,
    /// None `SameSite` policy (requires secure cookies)
    None,
}

impl SameSitePolicy {
    /// Cookie attribute value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        }
    }
}

/// A single named database connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Connection URL
    pub url: String,

    /// Maximum pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

const fn default_max_connections() -> u32 {
    10
}

/// Database registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Name of the connection returned when none is requested
    pub default_connection: String,

    /// Named connections
    pub connections: HashMap<String, ConnectionSettings>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            default_connection: "default".to_string(),
            connections: HashMap::new(),
        }
    }
}

/// Complete action-utils configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ActionUtilsConfig {
    /// Template engine settings
    #[serde(default)]
    pub templates: TemplateSettings,

    /// URL generation settings
    #[serde(default)]
    pub routing: RoutingSettings,

    /// Session settings
    #[serde(default)]
    pub session: SessionSettings,

    /// Database registry settings
    #[serde(default)]
    pub database: DatabaseSettings,
}

impl ActionUtilsConfig {
    /// Load configuration for a specific service
    ///
    /// Merges defaults, system config, user config, `./config.toml` and
    /// environment variables in increasing order of precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file cannot be parsed or a value
    /// has the wrong type.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use action_utils::config::ActionUtilsConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = ActionUtilsConfig::load_for_service("my-app")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load_for_service(service_name: &str) -> anyhow::Result<Self> {
        let mut figment =
            Figment::new().merge(Toml::string(&toml::to_string(&Self::default())?));

        let system_config = PathBuf::from("/etc/action-utils")
            .join(service_name)
            .join("config.toml");
        if system_config.exists() {
            figment = figment.merge(Toml::file(&system_config));
        }

        let user_config = Self::recommended_path(service_name);
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }

        let local_config = PathBuf::from("./config.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file over the defaults
    ///
    /// A missing file is not an error; environment variables still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or a value has the
    /// wrong type.
    pub fn load_from(path: &str) -> anyhow::Result<Self> {
        let config = Figment::new()
            .merge(Toml::string(&toml::to_string(&Self::default())?))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true))
            .extract()?;

        Ok(config)
    }

    /// Get the recommended XDG config path for a service
    ///
    /// ```rust
    /// use action_utils::config::ActionUtilsConfig;
    ///
    /// let path = ActionUtilsConfig::recommended_path("my-app");
    /// assert!(path.ends_with("config.toml"));
    /// ```
    #[must_use]
    pub fn recommended_path(service_name: &str) -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from("./config.toml"),
            |config_dir| {
                config_dir
                    .join("action-utils")
                    .join(service_name)
                    .join("config.toml")
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ActionUtilsConfig::default();
        assert_eq!(config.templates.template_dir, PathBuf::from("./templates"));
        assert!(!config.templates.strict_variables);
        assert_eq!(config.routing.scheme, "http");
        assert_eq!(config.routing.host, "localhost");
        assert_eq!(config.session.cookie_name, "action_session");
        assert_eq!(config.session.max_age_secs, 86400);
        assert_eq!(config.database.default_connection, "default");
        assert!(config.database.connections.is_empty());
    }

    #[test]
    fn test_session_defaults() {
        let session = SessionSettings::default();
        assert!(session.http_only);
        assert_eq!(session.same_site, SameSitePolicy::Lax);

        #[cfg(debug_assertions)]
        assert!(!session.secure);

        #[cfg(not(debug_assertions))]
        assert!(session.secure);
    }

    #[test]
    fn test_same_site_as_str() {
        assert_eq!(SameSitePolicy::Strict.as_str(), "Strict");
        assert_eq!(SameSitePolicy::Lax.as_str(), "Lax");
        assert_eq!(SameSitePolicy::None.as_str(), "None");
    }

    #[test]
    fn test_recommended_path() {
        let path = ActionUtilsConfig::recommended_path("test-app");
        let path = path.to_str().unwrap();
        assert!(path.contains("test-app"));
        assert!(path.ends_with("config.toml"));
    }

    #[test]
    fn test_load_from_nonexistent_file() {
        let config = ActionUtilsConfig::load_from("/nonexistent/path/config.toml").unwrap();
        assert_eq!(config.session.cookie_name, "action_session");
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"
[routing]
scheme = "https"
host = "shop.example.com"
base_url = "/store"

[database.connections.reporting]
url = "postgres://localhost/reporting"
"#,
        )
        .unwrap();

        let config = ActionUtilsConfig::load_from(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.routing.scheme, "https");
        assert_eq!(config.routing.host, "shop.example.com");
        assert_eq!(config.routing.base_url, "/store");
        assert_eq!(config.routing.https_port, 443);

        let reporting = &config.database.connections["reporting"];
        assert_eq!(reporting.url, "postgres://localhost/reporting");
        assert_eq!(reporting.max_connections, 10);
    }

    #[test]
    fn test_load_for_service_with_defaults() {
        let config = ActionUtilsConfig::load_for_service("nonexistent-service-123").unwrap();
        assert_eq!(config.routing.http_port, 80);
    }
}
