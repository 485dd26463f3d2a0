//! Shared setup for service integration tests.

#![allow(dead_code, clippy::expect_used)]

use inventory_core::{Properties, PropertySink, keys};
use inventory_service::{Config, InventoryApp};

/// Token accepted on protected routes in tests.
pub const API_TOKEN: &str = "test-token";

/// Properties published by the shared ephemeral database, plus a test token.
pub async fn harness_properties() -> Properties {
    inventory_testing::init_test_tracing();

    let postgres = inventory_testing::acquire()
        .await
        .expect("shared PostgreSQL should start");

    let mut props = Properties::new();
    inventory_testing::register_config(&mut props, postgres)
        .expect("running instance publishes its endpoint");
    props.add(keys::SECURITY_API_TOKEN, API_TOKEN.to_string());
    props
}

/// Bootstrap the full service against the shared ephemeral database.
pub async fn bootstrapped_app() -> InventoryApp {
    let config = Config::from_properties(&harness_properties().await)
        .expect("published properties resolve");
    InventoryApp::bootstrap(config)
        .await
        .expect("service should bootstrap")
}
