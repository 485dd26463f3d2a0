//! The process-wide shared instance.
//!
//! The first caller starts the container; every later caller gets the same
//! running handle. Configuration resolution in tests always goes through
//! [`acquire`] before it reads any datasource setting, so nothing can ever
//! observe an instance that has not finished starting.
//!
//! The container is removed when the test process exits normally. With the
//! container tool's `watchdog` enabled, an interrupted run (`SIGINT`,
//! `SIGTERM`, `SIGQUIT`) removes it as well.

use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::instance::{EphemeralPostgres, docker_runtime};
use tokio::sync::OnceCell;

static SHARED: OnceCell<Result<EphemeralPostgres, HarnessError>> = OnceCell::const_new();

/// Running shared instance configured from the environment.
///
/// # Errors
///
/// See [`acquire_with`]; also [`HarnessError::InvalidConfig`] for bad overrides.
pub async fn acquire() -> Result<&'static EphemeralPostgres, HarnessError> {
    acquire_with(HarnessConfig::from_env()?).await
}

/// Running shared instance with explicit settings.
///
/// Launches the container on first use only. A failed first start is
/// remembered and returned to every later caller; nothing is relaunched.
///
/// # Errors
///
/// - [`HarnessError::StartFailed`] if the shared start failed
/// - [`HarnessError::ConfigMismatch`] if the shared instance runs other settings
pub async fn acquire_with(
    config: HarnessConfig,
) -> Result<&'static EphemeralPostgres, HarnessError> {
    let requested = config.clone();
    let shared = SHARED
        .get_or_init(|| async move {
            let instance = EphemeralPostgres::new(requested);
            instance.start().await.map(|()| instance)
        })
        .await;

    match shared {
        Ok(instance) if *instance.config() == config => Ok(instance),
        Ok(instance) => Err(mismatch(&config, instance.config())),
        Err(e) => Err(e.clone()),
    }
}

/// [`acquire`] for synchronous callers.
///
/// # Errors
///
/// Returns [`HarnessError::BlockingInRuntime`] when called from inside an
/// async runtime, otherwise whatever [`acquire`] returns.
pub fn acquire_blocking() -> Result<&'static EphemeralPostgres, HarnessError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(HarnessError::BlockingInRuntime);
    }
    docker_runtime().block_on(acquire())
}

fn mismatch(requested: &HarnessConfig, running: &HarnessConfig) -> HarnessError {
    HarnessError::ConfigMismatch {
        requested: requested.describe(),
        running: running.describe(),
        fields: requested.differences(running).join(", "),
    }
}

/// Stop the shared instance, if one was started.
///
/// Runs on its own when the test process exits.
///
/// # Errors
///
/// Propagates [`EphemeralPostgres::stop`] failures.
pub async fn shutdown_shared() -> Result<(), HarnessError> {
    match SHARED.get() {
        Some(Ok(instance)) => instance.stop().await,
        _ => Ok(()),
    }
}

#[ctor::dtor]
fn shutdown_shared_at_exit() {
    if !matches!(SHARED.get(), Some(Ok(instance)) if instance.is_running()) {
        return;
    }
    if tokio::runtime::Handle::try_current().is_ok() {
        tracing::warn!("Process exiting inside a runtime; shared container left to the watchdog");
        return;
    }
    if let Err(e) = docker_runtime().block_on(shutdown_shared()) {
        tracing::warn!(error = %e, "Failed to remove the shared container at exit");
    }
}
