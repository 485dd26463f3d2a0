//! Harness errors.

use crate::lifecycle::Lifecycle;
use thiserror::Error;

/// Errors raised by the ephemeral database harness.
///
/// The type is `Clone` so that a failed shared start can be handed to every
/// caller that asks for the instance afterwards.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    /// The endpoint was read while the instance was not running.
    #[error("Ephemeral database is not running (state: {state})")]
    NotStarted {
        /// State observed at the time of the call.
        state: Lifecycle,
    },

    /// Another task is starting this instance right now.
    #[error("Ephemeral database start already in progress")]
    StartInProgress,

    /// The instance was torn down and cannot be started again.
    #[error("Ephemeral database was stopped and cannot be restarted")]
    AlreadyStopped,

    /// The container could not be launched or never became ready.
    #[error("Failed to start {image}: {reason}")]
    StartFailed {
        /// Image that was requested.
        image: String,
        /// Underlying container tool error.
        reason: String,
    },

    /// The shared instance is running with different settings.
    #[error("Shared ephemeral database runs {running}, but {requested} was requested (differs in: {fields})")]
    ConfigMismatch {
        /// Requested `database@image`.
        requested: String,
        /// Running `database@image`.
        running: String,
        /// Comma-separated names of the settings that differ.
        fields: String,
    },

    /// An override from the environment could not be used.
    #[error("Invalid harness setting {key}={value:?}: {reason}")]
    InvalidConfig {
        /// Variable name.
        key: String,
        /// Raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A blocking acquire was attempted from inside an async runtime.
    #[error("acquire_blocking called from within an async runtime; use acquire().await")]
    BlockingInRuntime,

    /// The readiness assertion failed.
    #[error("Ephemeral database failed its readiness check (state: {state})")]
    NotReady {
        /// State observed by the check.
        state: Lifecycle,
    },
}
