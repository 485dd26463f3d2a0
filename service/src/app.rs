//! Application bootstrap and lifecycle.
//!
//! Startup is a fixed sequence: connect the pool, apply migrations, check the
//! schema, assemble the router. Any failure aborts startup.

use crate::config::Config;
use axum::Router;
use inventory_postgres::DatabaseError;
use inventory_web::{AppState, SecuritySettings, build_router};
use sqlx::PgPool;
use std::future::Future;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

/// Root that bundled (`classpath:`) migration locations resolve against.
pub const RESOURCE_ROOT: &str = env!("CARGO_MANIFEST_DIR");

/// Errors that abort startup or serving.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// Connecting, migrating or validating the database failed.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// The listener could not be bound.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        /// Requested address.
        address: String,
        /// I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// A fully bootstrapped inventory service.
#[derive(Debug)]
pub struct InventoryApp {
    config: Config,
    pool: PgPool,
    router: Router,
}

impl InventoryApp {
    /// Bootstrap against the bundled migration scripts.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::Database`] if the database is unreachable,
    /// a migration fails, or schema validation fails.
    pub async fn bootstrap(config: Config) -> Result<Self, BootstrapError> {
        Self::bootstrap_with_resources(config, RESOURCE_ROOT).await
    }

    /// Bootstrap resolving `classpath:` locations against `resource_root`.
    ///
    /// # Errors
    ///
    /// See [`InventoryApp::bootstrap`].
    pub async fn bootstrap_with_resources(
        config: Config,
        resource_root: impl AsRef<Path>,
    ) -> Result<Self, BootstrapError> {
        let resource_root: PathBuf = resource_root.as_ref().to_path_buf();

        let pool = config.datasource.connect().await?;
        inventory_postgres::run_migrations(&pool, &config.migration, &resource_root).await?;
        config
            .persistence
            .schema_mode
            .apply(&pool, &config.migration, &resource_root)
            .await?;

        let state = AppState::new(SecuritySettings::new(config.security.api_token.clone()))
            .with_pool(pool.clone())
            .with_open_in_view(config.persistence.open_in_view);
        let router = build_router(state);

        info!(
            schema_mode = %config.persistence.schema_mode,
            open_in_view = config.persistence.open_in_view,
            "Inventory service bootstrapped"
        );

        Ok(Self {
            config,
            pool,
            router,
        })
    }

    /// Resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// The HTTP router, for in-process testing.
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Bind the configured address and serve until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::Bind`] or [`BootstrapError::Serve`].
    pub async fn serve(self) -> Result<(), BootstrapError> {
        let address = self.config.server.address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| BootstrapError::Bind { address, source })?;

        self.serve_on(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::Serve`] if the server fails.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> Result<(), BootstrapError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(address) = listener.local_addr() {
            info!(%address, "Server listening");
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(BootstrapError::Serve)?;

        self.pool.close().await;
        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down gracefully"),
        () = terminate => info!("Received SIGTERM, shutting down gracefully"),
    }
}
