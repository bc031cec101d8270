//! Named database connections
//!
//! [`ConnectionRegistry`] is what handlers reach through
//! [`ActionUtils::registry`](crate::actions::ActionUtils::registry): a set of
//! sqlx pools keyed by name, with one of them designated the default.
//!
//! ```rust,no_run
//! use action_utils::registry::ConnectionRegistry;
//! use sqlx::postgres::PgPoolOptions;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = PgPoolOptions::new().connect_lazy("postgres://localhost/app")?;
//! let registry = ConnectionRegistry::new("default").with_connection("default", pool);
//!
//! let row: (i64,) = sqlx::query_as("SELECT 1")
//!     .fetch_one(registry.default_connection()?)
//!     .await?;
//! # Ok(())
//! # }
//! ```

use sqlx::pool::PoolOptions;
use sqlx::{Database, Pool};
use std::collections::HashMap;
use thiserror::Error;

use crate::config::DatabaseSettings;

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No connection registered under this name
    #[error("database connection named \"{name}\" does not exist; known connections: {}", .available.join(", "))]
    UnknownConnection {
        /// Requested name
        name: String,
        /// Registered names
        available: Vec<String>,
    },

    /// A configured pool could not be created
    #[error("failed to create pool for connection \"{name}\": {source}")]
    Connect {
        /// Connection name
        name: String,
        /// Underlying error
        #[source]
        source: sqlx::Error,
    },
}

/// Named sqlx pools with a default
#[derive(Debug)]
pub struct ConnectionRegistry<DB: Database> {
    default_connection: String,
    pools: HashMap<String, Pool<DB>>,
}

impl<DB: Database> Clone for ConnectionRegistry<DB> {
    fn clone(&self) -> Self {
        Self {
            default_connection: self.default_connection.clone(),
            pools: self.pools.clone(),
        }
    }
}

impl<DB: Database> ConnectionRegistry<DB> {
    /// Empty registry whose default is `default_connection`
    #[must_use]
    pub fn new(default_connection: impl Into<String>) -> Self {
        Self {
            default_connection: default_connection.into(),
            pools: HashMap::new(),
        }
    }

    /// Registry with a lazy pool per configured connection
    ///
    /// No connection is opened until a pool is first used. Must be called
    /// inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Connect`] if a URL cannot be parsed.
    pub fn from_settings(settings: &DatabaseSettings) -> Result<Self, RegistryError> {
        let mut registry = Self::new(settings.default_connection.clone());
        for (name, connection) in &settings.connections {
            let pool = PoolOptions::<DB>::new()
                .max_connections(connection.max_connections)
                .connect_lazy(&connection.url)
                .map_err(|source| RegistryError::Connect {
                    name: name.clone(),
                    source,
                })?;
            registry.register(name.clone(), pool);
        }

        tracing::info!(
            connections = registry.pools.len(),
            default = %registry.default_connection,
            "connection registry configured"
        );
        Ok(registry)
    }

    /// Add or replace a connection
    pub fn register(&mut self, name: impl Into<String>, pool: Pool<DB>) -> &mut Self {
        self.pools.insert(name.into(), pool);
        self
    }

    /// Builder-style [`register`](Self::register)
    #[must_use]
    pub fn with_connection(mut self, name: impl Into<String>, pool: Pool<DB>) -> Self {
        self.register(name, pool);
        self
    }

    /// Connection by name; `None` selects the default
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownConnection`] if nothing is registered
    /// under the name.
    pub fn connection(&self, name: Option<&str>) -> Result<&Pool<DB>, RegistryError> {
        let name = name.unwrap_or(&self.default_connection);
        self.pools
            .get(name)
            .ok_or_else(|| RegistryError::UnknownConnection {
                name: name.to_string(),
                available: self.connection_names().into_iter().map(str::to_string).collect(),
            })
    }

    /// The default connection
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownConnection`] if the default name has
    /// no pool.
    pub fn default_connection(&self) -> Result<&Pool<DB>, RegistryError> {
        self.connection(None)
    }

    /// Name of the default connection
    #[must_use]
    pub fn default_connection_name(&self) -> &str {
        &self.default_connection
    }

    /// Registered names, sorted
    #[must_use]
    pub fn connection_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.pools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Whether a connection is registered
    #[must_use]
    pub fn has_connection(&self, name: &str) -> bool {
        self.pools.contains_key(name)
    }

    /// Close every pool
    pub async fn close(&self) {
        for pool in self.pools.values() {
            pool.close().await;
        }
    }
}
