//! Layered string properties and the sink trait producers write into.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while reading typed values out of [`Properties`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// A property was present but could not be parsed.
    #[error("Invalid value for property {key}: {value:?} ({reason})")]
    Invalid {
        /// Property key.
        key: String,
        /// Raw value that failed to parse.
        value: String,
        /// Parser message.
        reason: String,
    },
}

/// Destination for published configuration values.
///
/// Anything that resolves configuration from string properties can accept
/// values from the test harness by implementing this trait.
pub trait PropertySink {
    /// Publish `value` under `key`, replacing any earlier value.
    fn add(&mut self, key: &str, value: String);
}

/// Ordered key/value configuration registry.
///
/// Later writes override earlier ones, which gives the usual layering:
/// defaults, then environment, then values published by a harness.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build properties from `(property key, variable name)` pairs.
    ///
    /// `lookup` is asked for every variable name; absent variables are
    /// skipped so that defaults applied later stay in effect.
    ///
    /// # Example
    ///
    /// ```
    /// use inventory_core::Properties;
    ///
    /// let props = Properties::from_lookup(
    ///     &[("datasource.url", "DATABASE_URL"), ("server.port", "PORT")],
    ///     |name| (name == "PORT").then(|| "8081".to_string()),
    /// );
    /// assert_eq!(props.get("server.port"), Some("8081"));
    /// assert_eq!(props.get("datasource.url"), None);
    /// ```
    pub fn from_lookup<F>(mapping: &[(&str, &str)], lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut props = Self::new();
        for (key, variable) in mapping {
            if let Some(value) = lookup(variable) {
                props.add(key, value);
            }
        }
        props
    }

    /// Raw value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Raw value for `key`, or `default` when unset.
    #[must_use]
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Parse the value for `key`, `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::Invalid`] if the value does not parse as `T`.
    pub fn parse<T>(&self, key: &str) -> Result<Option<T>, PropertyError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.get(key)
            .map(|raw| {
                raw.trim().parse::<T>().map_err(|e| PropertyError::Invalid {
                    key: key.to_string(),
                    value: raw.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    /// Parse the value for `key`, falling back to `default` when unset.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::Invalid`] if the value does not parse as `T`.
    pub fn parse_or<T>(&self, key: &str, default: T) -> Result<T, PropertyError>
    where
        T: FromStr,
        T::Err: Display,
    {
        Ok(self.parse(key)?.unwrap_or(default))
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing has been published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PropertySink for Properties {
    fn add(&mut self, key: &str, value: String) {
        tracing::trace!(key, "property published");
        self.entries.insert(key.to_string(), value);
    }
}

impl PropertySink for BTreeMap<String, String> {
    fn add(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }
}
