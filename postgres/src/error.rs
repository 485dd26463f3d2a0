//! Errors raised while bootstrapping the datasource.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from connecting, migrating or validating the database.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The datasource URL could not be parsed.
    #[error("Invalid datasource URL {url}: {source}")]
    InvalidUrl {
        /// Offending URL.
        url: String,
        /// Parser error.
        #[source]
        source: sqlx::Error,
    },

    /// The pool could not open its first connection.
    #[error("Failed to connect to {url}: {source}")]
    Connect {
        /// URL (without credentials) that was dialed.
        url: String,
        /// Driver error.
        #[source]
        source: sqlx::Error,
    },

    /// A migration location string was empty or malformed.
    #[error("Invalid migration location: {0:?}")]
    InvalidLocation(String),

    /// Migration scripts could not be read from a location.
    #[error("Failed to load migrations from {}: {source}", .path.display())]
    LoadMigrations {
        /// Resolved directory.
        path: PathBuf,
        /// Loader error.
        #[source]
        source: sqlx::migrate::MigrateError,
    },

    /// Applying migrations failed.
    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A query against the database failed.
    #[error("Database query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// The configured schema mode would auto-generate or is unknown.
    #[error("Unsupported schema mode {0:?}: expected \"validate\" or \"none\"")]
    UnsupportedSchemaMode(String),

    /// Validation found no migration bookkeeping table.
    #[error("Schema validation failed: migration table is missing")]
    MissingMigrationTable,

    /// A known migration has not been applied.
    #[error("Schema validation failed: migration {version} ({description}) is not applied")]
    PendingMigration {
        /// Migration version.
        version: i64,
        /// Migration description.
        description: String,
    },

    /// An applied migration no longer matches its script.
    #[error("Schema validation failed: checksum mismatch for migration {version}")]
    ChecksumMismatch {
        /// Migration version.
        version: i64,
    },

    /// The database carries a migration that no location knows about.
    #[error("Schema validation failed: applied migration {version} is unknown")]
    UnknownMigration {
        /// Migration version.
        version: i64,
    },

    /// A migration failed half-way and left the schema dirty.
    #[error("Schema validation failed: migration {version} is dirty")]
    DirtyMigration {
        /// Migration version.
        version: i64,
    },
}
