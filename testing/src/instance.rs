//! One ephemeral `PostgreSQL` container and its lifecycle.

use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::lifecycle::{Lifecycle, LifecycleCell};
use inventory_core::{Properties, PropertySink, keys};
use std::sync::{LazyLock, OnceLock};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::runtime::Runtime;
use tokio::sync::Mutex;

/// Port `PostgreSQL` listens on inside the container.
const POSTGRES_PORT: u16 = 5432;

/// Runtime that owns every Docker call the harness makes.
///
/// `#[tokio::test]` builds a fresh runtime per test, while the shared
/// container outlives all of them; its client must stay on one runtime.
#[allow(clippy::expect_used)]
static DOCKER_RUNTIME: LazyLock<Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("ephemeral-postgres")
        .enable_all()
        .build()
        .expect("failed to build the ephemeral database runtime")
});

pub(crate) fn docker_runtime() -> &'static Runtime {
    &DOCKER_RUNTIME
}

/// Connection coordinates of a running instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Host the mapped port is reachable on.
    pub host: String,
    /// Host port mapped to the container's 5432.
    pub port: u16,
    /// Logical database name.
    pub database: String,
    /// Login role.
    pub username: String,
    /// Password for `username`.
    pub password: String,
    /// `postgres://host:port/database`, without credentials.
    pub url: String,
}

impl Endpoint {
    /// Build an endpoint and its URL.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let host = host.into();
        let database = database.into();
        let url = format!("postgres://{host}:{port}/{database}");
        Self {
            host,
            port,
            database,
            username: username.into(),
            password: password.into(),
            url,
        }
    }
}

/// A disposable `PostgreSQL` instance.
///
/// Most tests share one instance per process through
/// [`acquire`](crate::acquire). Suites that need their own database create
/// one with [`EphemeralPostgres::new`] and call [`start`](Self::start).
pub struct EphemeralPostgres {
    config: HarnessConfig,
    state: LifecycleCell,
    endpoint: OnceLock<Endpoint>,
    container: Mutex<Option<ContainerAsync<Postgres>>>,
}

impl std::fmt::Debug for EphemeralPostgres {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EphemeralPostgres")
            .field("config", &self.config)
            .field("state", &self.state.load())
            .field("endpoint", &self.endpoint.get())
            .finish_non_exhaustive()
    }
}

impl EphemeralPostgres {
    /// Create an instance in [`Lifecycle::NotStarted`]; nothing is launched.
    #[must_use]
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            state: LifecycleCell::new(),
            endpoint: OnceLock::new(),
            container: Mutex::new(None),
        }
    }

    /// Settings this instance was created with.
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> Lifecycle {
        self.state.load()
    }

    /// Snapshot: `true` while the instance is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state() == Lifecycle::Running
    }

    /// Connection coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::NotStarted`] unless the instance is running.
    pub fn endpoint(&self) -> Result<&Endpoint, HarnessError> {
        let state = self.state();
        if state != Lifecycle::Running {
            return Err(HarnessError::NotStarted { state });
        }
        self.endpoint.get().ok_or(HarnessError::NotStarted { state })
    }

    /// Assert the instance is ready to serve.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::NotReady`] unless the instance is running.
    pub fn readiness_check(&self) -> Result<(), HarnessError> {
        match self.endpoint() {
            Ok(_) => Ok(()),
            Err(_) => Err(HarnessError::NotReady {
                state: self.state(),
            }),
        }
    }

    /// Launch the container and wait until it accepts connections.
    ///
    /// Idempotent once running: a second call returns without relaunching.
    /// A failed or abandoned start moves the instance to
    /// [`Lifecycle::Stopped`]; there is no retry.
    ///
    /// # Errors
    ///
    /// - [`HarnessError::StartFailed`] if the container tool fails or times out
    /// - [`HarnessError::StartInProgress`] if another task is starting it
    /// - [`HarnessError::AlreadyStopped`] after [`stop`](Self::stop)
    pub async fn start(&self) -> Result<(), HarnessError> {
        self.start_with(launch(self.config.clone())).await
    }

    async fn start_with<F>(&self, launcher: F) -> Result<(), HarnessError>
    where
        F: Future<Output = Result<(ContainerAsync<Postgres>, Endpoint), HarnessError>>
            + Send
            + 'static,
    {
        match self.state.transition(Lifecycle::NotStarted, Lifecycle::Starting) {
            Ok(()) => {}
            Err(Lifecycle::Running) => {
                tracing::debug!(instance = %self.config.describe(), "Already running");
                return Ok(());
            }
            Err(Lifecycle::Stopped) => return Err(HarnessError::AlreadyStopped),
            Err(Lifecycle::Starting | Lifecycle::NotStarted) => {
                return Err(HarnessError::StartInProgress);
            }
        }
        let guard = StartGuard::arm(&self.state);

        tracing::info!(
            image = %self.config.image,
            database = %self.config.database,
            "Starting ephemeral PostgreSQL"
        );

        let launched = docker_runtime()
            .spawn(launcher)
            .await
            .map_err(|e| HarnessError::StartFailed {
                image: self.config.image.clone(),
                reason: e.to_string(),
            })
            .and_then(|result| result);

        match launched {
            Ok((container, endpoint)) => {
                tracing::info!(
                    container = %container.id(),
                    url = %endpoint.url,
                    "Ephemeral PostgreSQL running"
                );
                *self.container.lock().await = Some(container);
                let _ = self.endpoint.set(endpoint);
                self.state.store(Lifecycle::Running);
                guard.disarm();
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Ephemeral PostgreSQL failed to start");
                self.state.store(Lifecycle::Stopped);
                guard.disarm();
                Err(e)
            }
        }
    }

    /// Tear the instance down. Terminal; stopping twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::NotStarted`] if the instance never reached
    /// [`Lifecycle::Running`].
    pub async fn stop(&self) -> Result<(), HarnessError> {
        match self.state.transition(Lifecycle::Running, Lifecycle::Stopped) {
            Ok(()) => {}
            Err(Lifecycle::Stopped) => return Ok(()),
            Err(state) => return Err(HarnessError::NotStarted { state }),
        }

        let container = self.container.lock().await.take();
        if let Some(container) = container {
            let id = container.id().to_string();
            match docker_runtime().spawn(container.rm()).await {
                Ok(Ok(())) => tracing::info!(container = %id, "Ephemeral PostgreSQL removed"),
                Ok(Err(e)) => tracing::warn!(container = %id, error = %e, "Failed to remove container"),
                Err(e) => tracing::warn!(container = %id, error = %e, "Container removal task failed"),
            }
        }
        Ok(())
    }

    /// Publish connection coordinates and companion settings into `sink`.
    ///
    /// Keys written: datasource URL/username/password, migrations enabled
    /// with this instance's locations, schema mode `validate`, and
    /// open-in-view disabled.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::NotStarted`] unless the instance is running.
    pub fn register_config<S>(&self, sink: &mut S) -> Result<(), HarnessError>
    where
        S: PropertySink + ?Sized,
    {
        let endpoint = self.endpoint()?;
        publish(sink, endpoint, &self.config);
        tracing::debug!(url = %endpoint.url, "Datasource properties published");
        Ok(())
    }

    /// [`register_config`](Self::register_config) into a fresh registry.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::NotStarted`] unless the instance is running.
    pub fn properties(&self) -> Result<Properties, HarnessError> {
        let mut props = Properties::new();
        self.register_config(&mut props)?;
        Ok(props)
    }

    #[cfg(test)]
    pub(crate) fn running_at(config: HarnessConfig, endpoint: Endpoint) -> Self {
        let instance = Self::new(config);
        let _ = instance.endpoint.set(endpoint);
        instance.state.store(Lifecycle::Running);
        instance
    }
}

/// Moves an instance left in `Starting` to `Stopped` when the start
/// future is dropped before it settles.
struct StartGuard<'a> {
    state: &'a LifecycleCell,
    armed: bool,
}

impl<'a> StartGuard<'a> {
    const fn arm(state: &'a LifecycleCell) -> Self {
        Self { state, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for StartGuard<'_> {
    fn drop(&mut self) {
        if self.armed && self.state.transition(Lifecycle::Starting, Lifecycle::Stopped).is_ok() {
            tracing::warn!("Ephemeral PostgreSQL start abandoned before completion");
        }
    }
}

impl Drop for EphemeralPostgres {
    fn drop(&mut self) {
        if let Some(container) = self.container.get_mut().take() {
            tracing::debug!(container = %container.id(), "Removing ephemeral PostgreSQL on drop");
            drop(docker_runtime().spawn(container.rm()));
        }
    }
}

fn publish<S>(sink: &mut S, endpoint: &Endpoint, config: &HarnessConfig)
where
    S: PropertySink + ?Sized,
{
    sink.add(keys::DATASOURCE_URL, endpoint.url.clone());
    sink.add(keys::DATASOURCE_USERNAME, endpoint.username.clone());
    sink.add(keys::DATASOURCE_PASSWORD, endpoint.password.clone());
    sink.add(keys::MIGRATION_ENABLED, "true".to_string());
    sink.add(keys::MIGRATION_LOCATIONS, config.migration_locations.clone());
    sink.add(keys::PERSISTENCE_SCHEMA_MODE, "validate".to_string());
    sink.add(keys::PERSISTENCE_OPEN_IN_VIEW, "false".to_string());
}

async fn launch(
    config: HarnessConfig,
) -> Result<(ContainerAsync<Postgres>, Endpoint), HarnessError> {
    let failed = |reason: String| HarnessError::StartFailed {
        image: config.image.clone(),
        reason,
    };

    let (name, tag) = config.image_parts();
    let container = Postgres::default()
        .with_db_name(&config.database)
        .with_user(&config.username)
        .with_password(&config.password)
        .with_name(name)
        .with_tag(tag)
        .with_startup_timeout(config.startup_timeout)
        .start()
        .await
        .map_err(|e| failed(e.to_string()))?;

    let host = container
        .get_host()
        .await
        .map_err(|e| failed(e.to_string()))?;
    let port = container
        .get_host_port_ipv4(POSTGRES_PORT)
        .await
        .map_err(|e| failed(e.to_string()))?;

    let endpoint = Endpoint::new(
        host.to_string(),
        port,
        config.database.clone(),
        config.username.clone(),
        config.password.clone(),
    );
    Ok((container, endpoint))
}
