//! # Inventory Core
//!
//! Configuration plumbing shared by the inventory service and its test harness.
//!
//! Components that *produce* settings (the process environment, a `.env` file,
//! the ephemeral database harness) write string key/value pairs into a
//! [`PropertySink`]. The service resolves its typed configuration from the
//! resulting [`Properties`] in a single step, so whatever was published last
//! wins.
//!
//! ## Example
//!
//! ```
//! use inventory_core::{keys, Properties, PropertySink};
//!
//! let mut props = Properties::new();
//! props.add(keys::DATASOURCE_URL, "postgres://localhost:5432/pokedex".to_string());
//! props.add(keys::MIGRATION_ENABLED, "true".to_string());
//!
//! assert_eq!(props.get(keys::DATASOURCE_URL), Some("postgres://localhost:5432/pokedex"));
//! assert!(props.parse_or(keys::MIGRATION_ENABLED, false).unwrap());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod keys;
pub mod properties;

pub use properties::{Properties, PropertyError, PropertySink};
