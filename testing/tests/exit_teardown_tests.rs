//! The shared container does not outlive the test process.
//!
//! A child copy of this binary acquires the shared instance and exits; the
//! parent then checks the mapped port is gone. Requires Docker:
//!
//! ```bash
//! cargo test -p inventory-testing --test exit_teardown_tests -- --ignored
//! ```

#![allow(clippy::expect_used)]

mod common;

use inventory_testing::acquire;
use std::net::TcpStream;
use std::time::Duration;

const HOST_MARKER: &str = "shared-host=";
const PORT_MARKER: &str = "shared-port=";

#[tokio::test]
#[ignore]
async fn child_holds_shared_instance() {
    if !common::is_child() {
        return;
    }
    let postgres = acquire().await.expect("PostgreSQL should start");
    let endpoint = postgres.endpoint().expect("running");

    TcpStream::connect((endpoint.host.as_str(), endpoint.port))
        .expect("container accepts connections while the process lives");
    println!("{HOST_MARKER}{}", endpoint.host);
    println!("{PORT_MARKER}{}", endpoint.port);
}

#[test]
#[ignore]
fn test_shared_container_removed_when_process_exits() {
    let output = common::run_child("child_holds_shared_instance", &[]);

    let host = common::reported(&output, HOST_MARKER).expect("child reported its host");
    let port: u16 = common::reported(&output, PORT_MARKER)
        .expect("child reported its port")
        .parse()
        .expect("numeric port");

    let address = std::net::ToSocketAddrs::to_socket_addrs(&(host.as_str(), port))
        .expect("resolvable host")
        .next()
        .expect("at least one address");
    assert!(
        TcpStream::connect_timeout(&address, Duration::from_secs(2)).is_err(),
        "container on {host}:{port} survived its process"
    );
}
