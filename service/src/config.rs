//! Service configuration.
//!
//! Values are resolved from a [`Properties`] registry so that the same code
//! path serves the binary (environment + `.env`) and tests (properties
//! published by the ephemeral database harness).

use inventory_core::{Properties, PropertyError, keys};
use inventory_postgres::{
    DEFAULT_MIGRATION_LOCATION, DataSourceSettings, DatabaseError, MigrationSettings, SchemaMode,
};
use thiserror::Error;

/// Datasource URL used when none is configured.
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432/pokedex_inventory";
/// Bind address used when none is configured.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Port used when none is configured.
pub const DEFAULT_PORT: u16 = 8080;

/// Environment variable backing each property key.
pub const ENV_MAPPING: &[(&str, &str)] = &[
    (keys::DATASOURCE_URL, "DATABASE_URL"),
    (keys::DATASOURCE_USERNAME, "DATABASE_USERNAME"),
    (keys::DATASOURCE_PASSWORD, "DATABASE_PASSWORD"),
    (keys::DATASOURCE_MAX_CONNECTIONS, "DATABASE_MAX_CONNECTIONS"),
    (keys::DATASOURCE_CONNECT_TIMEOUT, "DATABASE_CONNECT_TIMEOUT"),
    (keys::MIGRATION_ENABLED, "MIGRATION_ENABLED"),
    (keys::MIGRATION_LOCATIONS, "MIGRATION_LOCATIONS"),
    (keys::PERSISTENCE_SCHEMA_MODE, "SCHEMA_MODE"),
    (keys::PERSISTENCE_OPEN_IN_VIEW, "OPEN_IN_VIEW"),
    (keys::SERVER_HOST, "HOST"),
    (keys::SERVER_PORT, "PORT"),
    (keys::SECURITY_API_TOKEN, "API_TOKEN"),
];

/// Errors raised while resolving [`Config`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A property was missing or malformed.
    #[error(transparent)]
    Property(#[from] PropertyError),

    /// Migration locations did not parse.
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Connection pool settings.
    pub datasource: DataSourceSettings,
    /// Startup migrations.
    pub migration: MigrationSettings,
    /// Schema checks and session handling.
    pub persistence: PersistenceConfig,
    /// HTTP listener.
    pub server: ServerConfig,
    /// Authorization.
    pub security: SecurityConfig,
}

/// Persistence behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistenceConfig {
    /// Schema check performed at startup.
    pub schema_mode: SchemaMode,
    /// Hold one pooled connection per HTTP request.
    pub open_in_view: bool,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

impl ServerConfig {
    /// `host:port` for binding.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Authorization configuration.
#[derive(Clone, Default)]
pub struct SecurityConfig {
    /// Bearer token accepted on non-public routes.
    pub api_token: Option<String>,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Config {
    /// Load configuration from `.env` and the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env");
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_properties(&Properties::from_lookup(ENV_MAPPING, lookup))
    }

    /// Resolve configuration from properties, applying defaults for unset keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for unparsable numbers, booleans, schema
    /// modes or migration locations.
    pub fn from_properties(props: &Properties) -> Result<Self, ConfigError> {
        let mut datasource = DataSourceSettings::new(
            props.get_or(keys::DATASOURCE_URL, DEFAULT_DATABASE_URL),
            props.get_or(keys::DATASOURCE_USERNAME, ""),
            props.get_or(keys::DATASOURCE_PASSWORD, ""),
        );
        datasource.max_connections =
            props.parse_or(keys::DATASOURCE_MAX_CONNECTIONS, datasource.max_connections)?;
        datasource.connect_timeout =
            props.parse_or(keys::DATASOURCE_CONNECT_TIMEOUT, datasource.connect_timeout)?;

        let migration = MigrationSettings::parse(
            props.parse_or(keys::MIGRATION_ENABLED, true)?,
            props.get_or(keys::MIGRATION_LOCATIONS, DEFAULT_MIGRATION_LOCATION),
        )?;

        let persistence = PersistenceConfig {
            schema_mode: props.parse_or(keys::PERSISTENCE_SCHEMA_MODE, SchemaMode::Validate)?,
            open_in_view: props.parse_or(keys::PERSISTENCE_OPEN_IN_VIEW, false)?,
        };

        let server = ServerConfig {
            host: props.get_or(keys::SERVER_HOST, DEFAULT_HOST).to_string(),
            port: props.parse_or(keys::SERVER_PORT, DEFAULT_PORT)?,
        };

        let security = SecurityConfig {
            api_token: props
                .get(keys::SECURITY_API_TOKEN)
                .filter(|t| !t.trim().is_empty())
                .map(str::to_string),
        };

        Ok(Self {
            datasource,
            migration,
            persistence,
            server,
            security,
        })
    }
}
