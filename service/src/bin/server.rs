//! Inventory HTTP server.

use inventory_service::{Config, InventoryApp};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inventory=info,tower_http=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting inventory server");

    let config = Config::from_env()?;
    info!(
        database_url = %config.datasource.url,
        address = %config.server.address(),
        "Configuration loaded"
    );

    InventoryApp::bootstrap(config).await?.serve().await?;
    Ok(())
}
