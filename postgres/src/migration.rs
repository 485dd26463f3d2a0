//! Migration script locations and the migration runner.
//!
//! Locations use a small scheme prefix:
//!
//! - `classpath:<dir>`: scripts bundled with the application, resolved
//!   against the application's resource root
//! - `filesystem:<dir>` or a bare path: resolved as given
//!
//! Several locations may be listed, comma-separated. They are applied in
//! order and each one ignores versions that belong to the others.

use crate::error::DatabaseError;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use std::path::{Path, PathBuf};

/// Default location for bundled migration scripts.
pub const DEFAULT_MIGRATION_LOCATION: &str = "classpath:db/migration";

const CLASSPATH_PREFIX: &str = "classpath:";
const FILESYSTEM_PREFIX: &str = "filesystem:";

/// One migration script directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationLocation {
    /// Bundled with the application; relative to its resource root.
    Bundled(PathBuf),
    /// Plain filesystem directory.
    Filesystem(PathBuf),
}

impl MigrationLocation {
    /// Parse a single location.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::InvalidLocation`] if the location is blank.
    pub fn parse(raw: &str) -> Result<Self, DatabaseError> {
        let raw = raw.trim();

        let location = if let Some(rest) = raw.strip_prefix(CLASSPATH_PREFIX) {
            let rest = rest.trim_start_matches('/');
            if rest.is_empty() {
                return Err(DatabaseError::InvalidLocation(raw.to_string()));
            }
            Self::Bundled(PathBuf::from(rest))
        } else {
            let rest = raw.strip_prefix(FILESYSTEM_PREFIX).unwrap_or(raw);
            if rest.is_empty() {
                return Err(DatabaseError::InvalidLocation(raw.to_string()));
            }
            Self::Filesystem(PathBuf::from(rest))
        };

        Ok(location)
    }

    /// Parse a comma-separated list of locations.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::InvalidLocation`] if the list or any entry is blank.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, DatabaseError> {
        if raw.trim().is_empty() {
            return Err(DatabaseError::InvalidLocation(raw.to_string()));
        }
        raw.split(',').map(Self::parse).collect()
    }

    /// Directory this location points at.
    #[must_use]
    pub fn resolve(&self, resource_root: impl AsRef<Path>) -> PathBuf {
        match self {
            Self::Bundled(path) => resource_root.as_ref().join(path),
            Self::Filesystem(path) => path.clone(),
        }
    }

    /// Load the scripts under this location.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::LoadMigrations`] if the directory cannot be read.
    pub async fn load(&self, resource_root: impl AsRef<Path>) -> Result<Migrator, DatabaseError> {
        let path = self.resolve(resource_root);
        Migrator::new(path.clone())
            .await
            .map_err(|source| DatabaseError::LoadMigrations { path, source })
    }
}

/// Whether and from where migrations run at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationSettings {
    /// Run migrations at startup.
    pub enabled: bool,
    /// Script locations, applied in order.
    pub locations: Vec<MigrationLocation>,
}

impl MigrationSettings {
    /// Build settings from a comma-separated location list.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::InvalidLocation`] for blank entries.
    pub fn parse(enabled: bool, locations: &str) -> Result<Self, DatabaseError> {
        Ok(Self {
            enabled,
            locations: MigrationLocation::parse_list(locations)?,
        })
    }
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            locations: vec![MigrationLocation::Bundled(PathBuf::from("db/migration"))],
        }
    }
}

/// Apply every pending migration from every configured location.
///
/// Does nothing when migrations are disabled.
///
/// # Errors
///
/// Returns [`DatabaseError::LoadMigrations`] or [`DatabaseError::Migrate`].
pub async fn run_migrations(
    pool: &PgPool,
    settings: &MigrationSettings,
    resource_root: impl AsRef<Path>,
) -> Result<(), DatabaseError> {
    if !settings.enabled {
        tracing::info!("Schema migrations disabled");
        return Ok(());
    }

    let resource_root = resource_root.as_ref();
    for location in &settings.locations {
        let mut migrator = location.load(resource_root).await?;
        // Other locations own their own versions.
        migrator.set_ignore_missing(true);

        tracing::info!(
            location = %location.resolve(resource_root).display(),
            scripts = migrator.iter().count(),
            "Applying migrations"
        );
        migrator.run(pool).await?;
    }

    tracing::info!(locations = settings.locations.len(), "Migrations applied");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_bundled_location() {
        let location = MigrationLocation::parse(DEFAULT_MIGRATION_LOCATION).unwrap();
        assert_eq!(location, MigrationLocation::Bundled(PathBuf::from("db/migration")));
        assert_eq!(
            location.resolve("/srv/app"),
            PathBuf::from("/srv/app/db/migration")
        );
    }

    #[test]
    fn strips_leading_slash_from_bundled_location() {
        let location = MigrationLocation::parse("classpath:/db/migration").unwrap();
        assert_eq!(location, MigrationLocation::Bundled(PathBuf::from("db/migration")));
    }

    #[test]
    fn filesystem_and_bare_paths_resolve_as_given() {
        let prefixed = MigrationLocation::parse("filesystem:/opt/migrations").unwrap();
        let bare = MigrationLocation::parse("/opt/migrations").unwrap();

        assert_eq!(prefixed, bare);
        assert_eq!(bare.resolve("/ignored"), PathBuf::from("/opt/migrations"));
    }

    #[test]
    fn parses_comma_separated_list_in_order() {
        let locations =
            MigrationLocation::parse_list("classpath:db/migration, filesystem:/tmp/seed").unwrap();

        assert_eq!(
            locations,
            vec![
                MigrationLocation::Bundled(PathBuf::from("db/migration")),
                MigrationLocation::Filesystem(PathBuf::from("/tmp/seed")),
            ]
        );
    }

    #[test]
    fn rejects_blank_entries() {
        assert!(MigrationLocation::parse_list("").is_err());
        assert!(MigrationLocation::parse_list("classpath:db/migration,,").is_err());
        assert!(MigrationLocation::parse("classpath:").is_err());
        assert!(MigrationLocation::parse("filesystem:").is_err());
    }

    #[test]
    fn default_settings_use_bundled_location() {
        let settings = MigrationSettings::default();
        assert!(settings.enabled);
        assert_eq!(
            settings,
            MigrationSettings::parse(true, DEFAULT_MIGRATION_LOCATION).unwrap()
        );
    }
}
