//! Pokédex inventory service.
//!
//! Wires configuration, the `PostgreSQL` datasource and the HTTP surface
//! together:
//!
//! ```ignore
//! let config = Config::from_env()?;
//! InventoryApp::bootstrap(config).await?.serve().await?;
//! ```
//!
//! Tests resolve configuration from the ephemeral database harness instead
//! of the environment:
//!
//! ```ignore
//! let postgres = inventory_testing::acquire().await?;
//! let mut props = Properties::new();
//! inventory_testing::register_config(&mut props, postgres)?;
//! let app = InventoryApp::bootstrap(Config::from_properties(&props)?).await?;
//! ```

pub mod app;
pub mod config;

pub use app::{BootstrapError, InventoryApp, RESOURCE_ROOT};
pub use config::{Config, ConfigError, PersistenceConfig, SecurityConfig, ServerConfig};
