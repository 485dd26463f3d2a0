//! Harness settings and their environment overrides.

use crate::error::HarnessError;
use std::env;
use std::time::Duration;

/// Image used when `TEST_DATASOURCE_IMAGE` is unset.
pub const DEFAULT_IMAGE: &str = "postgres:16-alpine";
/// Database name used when `TEST_DATASOURCE_DB` is unset.
pub const DEFAULT_DATABASE: &str = "pokedex_test";
/// Login role used when `TEST_DATASOURCE_USER` is unset.
pub const DEFAULT_USERNAME: &str = "test";
/// Password used when `TEST_DATASOURCE_PASSWORD` is unset.
pub const DEFAULT_PASSWORD: &str = "test";
/// Migration location used when neither `MIGRATION_LOCATIONS` nor
/// `FLYWAY_LOCATIONS` is set.
pub const DEFAULT_MIGRATION_LOCATIONS: &str = "classpath:db/migration";
/// Startup timeout used when `TEST_DATASOURCE_STARTUP_TIMEOUT_SECS` is unset.
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(60);

/// Overrides the container image (`name:tag`).
pub const IMAGE_VAR: &str = "TEST_DATASOURCE_IMAGE";
/// Overrides the database name.
pub const DATABASE_VAR: &str = "TEST_DATASOURCE_DB";
/// Overrides the login role.
pub const USERNAME_VAR: &str = "TEST_DATASOURCE_USER";
/// Overrides the password.
pub const PASSWORD_VAR: &str = "TEST_DATASOURCE_PASSWORD";
/// Overrides the published migration locations.
pub const MIGRATION_LOCATIONS_VAR: &str = "MIGRATION_LOCATIONS";
/// Legacy alias of [`MIGRATION_LOCATIONS_VAR`]; consulted only when that is unset.
pub const FLYWAY_LOCATIONS_VAR: &str = "FLYWAY_LOCATIONS";
/// Overrides the container startup timeout, in seconds.
pub const STARTUP_TIMEOUT_VAR: &str = "TEST_DATASOURCE_STARTUP_TIMEOUT_SECS";

/// Settings for one ephemeral `PostgreSQL` instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Container image as `name:tag`.
    pub image: String,
    /// Logical database created at startup.
    pub database: String,
    /// Login role.
    pub username: String,
    /// Password for `username`.
    pub password: String,
    /// Published as the migration location setting.
    pub migration_locations: String,
    /// Passed to the container tool as its readiness deadline.
    pub startup_timeout: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            image: DEFAULT_IMAGE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            migration_locations: DEFAULT_MIGRATION_LOCATIONS.to_string(),
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
        }
    }
}

impl HarnessConfig {
    /// Defaults overridden by the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::InvalidConfig`] for a malformed timeout.
    pub fn from_env() -> Result<Self, HarnessError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::InvalidConfig`] for a malformed timeout.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HarnessError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let startup_timeout = match value(STARTUP_TIMEOUT_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| HarnessError::InvalidConfig {
                    key: STARTUP_TIMEOUT_VAR.to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                })?,
            None => defaults.startup_timeout,
        };

        Ok(Self {
            image: value(IMAGE_VAR).unwrap_or(defaults.image),
            database: value(DATABASE_VAR).unwrap_or(defaults.database),
            username: value(USERNAME_VAR).unwrap_or(defaults.username),
            password: value(PASSWORD_VAR).unwrap_or(defaults.password),
            migration_locations: value(MIGRATION_LOCATIONS_VAR)
                .or_else(|| value(FLYWAY_LOCATIONS_VAR))
                .unwrap_or(defaults.migration_locations),
            startup_timeout,
        })
    }

    /// Use another image.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Use another database name.
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Use other credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Use another startup timeout.
    #[must_use]
    pub const fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    /// Split the image into repository and tag; a missing tag means `latest`.
    ///
    /// A colon that belongs to a registry port (`registry:5000/postgres`) is
    /// not mistaken for the tag separator.
    #[must_use]
    pub fn image_parts(&self) -> (&str, &str) {
        match self.image.rsplit_once(':') {
            Some((name, tag)) if !name.is_empty() && !tag.is_empty() && !tag.contains('/') => {
                (name, tag)
            }
            _ => (self.image.as_str(), "latest"),
        }
    }

    /// Names of the settings that differ from `other`, in declaration order.
    ///
    /// Values are left out so that passwords never reach an error message.
    #[must_use]
    pub fn differences(&self, other: &Self) -> Vec<&'static str> {
        [
            ("image", self.image == other.image),
            ("database", self.database == other.database),
            ("username", self.username == other.username),
            ("password", self.password == other.password),
            ("migration_locations", self.migration_locations == other.migration_locations),
            ("startup_timeout", self.startup_timeout == other.startup_timeout),
        ]
        .into_iter()
        .filter_map(|(field, same)| (!same).then_some(field))
        .collect()
    }

    /// `database@image`, used in logs and mismatch errors.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{}@{}", self.database, self.image)
    }
}
