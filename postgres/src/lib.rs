//! `PostgreSQL` datasource bootstrap for the inventory service.
//!
//! This crate turns the datasource/migration/persistence settings resolved from
//! configuration into a ready-to-use connection pool:
//!
//! - Connection pooling over sqlx with credentials applied on top of the URL
//! - Versioned schema migrations loaded from one or more script locations
//! - Schema validation at startup (never auto-generation)
//!
//! # Example
//!
//! ```ignore
//! use inventory_postgres::{DataSourceSettings, MigrationSettings, SchemaMode};
//!
//! async fn example() -> Result<(), inventory_postgres::DatabaseError> {
//!     let pool = DataSourceSettings::new("postgres://localhost:5432/pokedex", "app", "secret")
//!         .connect()
//!         .await?;
//!
//!     let migrations = MigrationSettings::parse(true, "classpath:db/migration")?;
//!     inventory_postgres::run_migrations(&pool, &migrations, env!("CARGO_MANIFEST_DIR")).await?;
//!     SchemaMode::Validate
//!         .apply(&pool, &migrations, env!("CARGO_MANIFEST_DIR"))
//!         .await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod datasource;
pub mod error;
pub mod migration;
pub mod schema;

pub use datasource::{DataSourceSettings, ping};
pub use error::DatabaseError;
pub use migration::{
    DEFAULT_MIGRATION_LOCATION, MigrationLocation, MigrationSettings, run_migrations,
};
pub use schema::{SchemaMode, validate_schema};
