//! Names of the configuration properties the service understands.
//!
//! The ephemeral database harness publishes the datasource, migration and
//! persistence keys; the remaining keys come from the environment.

/// Datasource connection URL (`postgres://host:port/database`).
pub const DATASOURCE_URL: &str = "datasource.url";
/// Datasource login role.
pub const DATASOURCE_USERNAME: &str = "datasource.username";
/// Datasource password.
pub const DATASOURCE_PASSWORD: &str = "datasource.password";
/// Pool size cap.
pub const DATASOURCE_MAX_CONNECTIONS: &str = "datasource.max-connections";
/// Pool acquire timeout in seconds.
pub const DATASOURCE_CONNECT_TIMEOUT: &str = "datasource.connect-timeout";

/// Whether schema migrations run at startup.
pub const MIGRATION_ENABLED: &str = "migration.enabled";
/// Comma-separated migration script locations.
pub const MIGRATION_LOCATIONS: &str = "migration.locations";

/// Schema handling at startup: `validate` or `none`.
pub const PERSISTENCE_SCHEMA_MODE: &str = "persistence.schema-mode";
/// Hold one pooled connection for the lifetime of each HTTP request.
pub const PERSISTENCE_OPEN_IN_VIEW: &str = "persistence.open-in-view";

/// Address the HTTP server binds to.
pub const SERVER_HOST: &str = "server.host";
/// Port the HTTP server binds to.
pub const SERVER_PORT: &str = "server.port";

/// Bearer token accepted on non-public endpoints.
pub const SECURITY_API_TOKEN: &str = "security.api-token";
