//! Environment overrides reach the published datasource URL.
//!
//! The override is set on a child copy of this binary, so [`acquire`] reads
//! it from the real process environment. Requires Docker:
//!
//! ```bash
//! cargo test -p inventory-testing --test custom_database_tests -- --ignored
//! ```

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

mod common;

use inventory_core::keys;
use inventory_testing::{HarnessConfig, acquire};

const URL_MARKER: &str = "published-url=";
const USERNAME_MARKER: &str = "published-username=";

#[tokio::test]
#[ignore]
async fn child_publishes_from_environment() {
    if !common::is_child() {
        return;
    }
    let postgres = acquire().await.expect("PostgreSQL should start");
    let props = postgres.properties().expect("running instance publishes");

    println!("{URL_MARKER}{}", props.get(keys::DATASOURCE_URL).unwrap());
    println!("{USERNAME_MARKER}{}", props.get(keys::DATASOURCE_USERNAME).unwrap());
}

#[test]
#[ignore]
fn test_database_override_is_published() {
    let output = common::run_child(
        "child_publishes_from_environment",
        &[("TEST_DATASOURCE_DB", "custom_db")],
    );

    let url = common::reported(&output, URL_MARKER).expect("child reported its url");
    assert!(url.ends_with("/custom_db"), "url {url} should name custom_db");
    assert_eq!(
        common::reported(&output, USERNAME_MARKER).as_deref(),
        Some("test")
    );
}

#[tokio::test]
#[ignore]
async fn test_owned_instance_stops_for_good() {
    let postgres = inventory_testing::EphemeralPostgres::new(
        HarnessConfig::default().with_database("per_suite"),
    );

    postgres.start().await.expect("owned instance starts");
    let first_port = postgres.endpoint().expect("running").port;
    postgres.start().await.expect("second start is a no-op");
    assert_eq!(postgres.endpoint().expect("still running").port, first_port);

    postgres.stop().await.expect("stop");
    assert!(!postgres.is_running());
    assert!(postgres.endpoint().is_err());
}
