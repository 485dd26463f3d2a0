//! # Inventory Testing
//!
//! Integration-test support for the inventory service.
//!
//! The main piece is an ephemeral `PostgreSQL` harness: a disposable
//! database container started before the service resolves its datasource
//! settings, whose live coordinates are then published into the service's
//! configuration.
//!
//! ## Example
//!
//! ```ignore
//! use inventory_core::Properties;
//! use inventory_testing::acquire;
//!
//! #[tokio::test]
//! async fn test_with_database() {
//!     let postgres = acquire().await.expect("database starts");
//!     postgres.readiness_check().expect("database is ready");
//!
//!     let mut props = Properties::new();
//!     postgres.register_config(&mut props).expect("running instance");
//!
//!     let config = inventory_service::Config::from_properties(&props).unwrap();
//!     // ... bootstrap the service against `config`
//! }
//! ```
//!
//! ## Sharing
//!
//! [`acquire`] hands out one instance per test process. Suites that need an
//! isolated database build their own [`EphemeralPostgres`], start it, and
//! stop it when done.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod instance;
pub mod lifecycle;
pub mod shared;

pub use config::HarnessConfig;
pub use error::HarnessError;
pub use instance::{EphemeralPostgres, Endpoint};
pub use lifecycle::Lifecycle;
pub use shared::{acquire, acquire_blocking, acquire_with, shutdown_shared};

use inventory_core::PropertySink;
use tracing_subscriber::EnvFilter;

/// Connection coordinates of `handle`.
///
/// # Errors
///
/// Returns [`HarnessError::NotStarted`] unless the instance is running.
pub fn endpoint(handle: &EphemeralPostgres) -> Result<&Endpoint, HarnessError> {
    handle.endpoint()
}

/// Snapshot of whether `handle` is running.
#[must_use]
pub fn is_running(handle: &EphemeralPostgres) -> bool {
    handle.is_running()
}

/// Publish `handle`'s datasource settings into `sink`.
///
/// # Errors
///
/// Returns [`HarnessError::NotStarted`] unless the instance is running.
pub fn register_config<S>(sink: &mut S, handle: &EphemeralPostgres) -> Result<(), HarnessError>
where
    S: PropertySink + ?Sized,
{
    handle.register_config(sink)
}

/// Install a test-friendly tracing subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to `info` with sqlx quieted down.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .with_test_writer()
        .try_init();
}
