//! Startup schema checks.
//!
//! The service never generates or alters its schema from code. At most it
//! validates that the database matches the migration scripts it ships with.

use crate::error::DatabaseError;
use crate::migration::MigrationSettings;
use sqlx::PgPool;
use sqlx::migrate::Migrate;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// What to do with the schema at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaMode {
    /// Fail startup unless every known migration is applied unchanged.
    #[default]
    Validate,
    /// Skip schema checks.
    None,
}

impl SchemaMode {
    /// Run the check this mode asks for.
    ///
    /// # Errors
    ///
    /// Propagates [`validate_schema`] failures in [`SchemaMode::Validate`].
    pub async fn apply(
        self,
        pool: &PgPool,
        migrations: &MigrationSettings,
        resource_root: impl AsRef<Path>,
    ) -> Result<(), DatabaseError> {
        match self {
            Self::Validate => validate_schema(pool, migrations, resource_root).await,
            Self::None => {
                tracing::debug!("Schema validation skipped");
                Ok(())
            }
        }
    }
}

impl FromStr for SchemaMode {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "validate" => Ok(Self::Validate),
            "none" => Ok(Self::None),
            _ => Err(DatabaseError::UnsupportedSchemaMode(s.to_string())),
        }
    }
}

impl fmt::Display for SchemaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validate => write!(f, "validate"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Check the database against the scripts under every configured location.
///
/// Validation fails when the bookkeeping table is missing while scripts
/// exist, when any script is unapplied or was edited after being applied,
/// when the database carries versions no location knows, or when a
/// migration was left dirty.
///
/// # Errors
///
/// One of the `DatabaseError` schema-validation variants, or a query error.
pub async fn validate_schema(
    pool: &PgPool,
    migrations: &MigrationSettings,
    resource_root: impl AsRef<Path>,
) -> Result<(), DatabaseError> {
    let resource_root = resource_root.as_ref();

    let mut known = BTreeMap::new();
    for location in &migrations.locations {
        let migrator = location.load(resource_root).await?;
        for migration in migrator.iter() {
            if migration.migration_type.is_down_migration() {
                continue;
            }
            known.insert(
                migration.version,
                (migration.description.to_string(), migration.checksum.to_vec()),
            );
        }
    }

    let table_exists: bool =
        sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
            .fetch_one(pool)
            .await?;

    if !table_exists {
        if known.is_empty() {
            return Ok(());
        }
        return Err(DatabaseError::MissingMigrationTable);
    }

    let mut conn = pool.acquire().await?;
    if let Some(version) = conn.dirty_version().await? {
        return Err(DatabaseError::DirtyMigration { version });
    }

    let applied: BTreeMap<i64, Vec<u8>> = conn
        .list_applied_migrations()
        .await?
        .into_iter()
        .map(|m| (m.version, m.checksum.to_vec()))
        .collect();

    for (version, (description, checksum)) in &known {
        match applied.get(version) {
            None => {
                return Err(DatabaseError::PendingMigration {
                    version: *version,
                    description: description.clone(),
                });
            }
            Some(applied_checksum) if applied_checksum != checksum => {
                return Err(DatabaseError::ChecksumMismatch { version: *version });
            }
            Some(_) => {}
        }
    }

    if let Some(version) = applied.keys().find(|v| !known.contains_key(v)) {
        return Err(DatabaseError::UnknownMigration { version: *version });
    }

    tracing::info!(migrations = known.len(), "Schema validated");
    Ok(())
}
