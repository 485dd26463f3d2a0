//! Liveness probe.

/// `GET /ping` answers `pong` as plain text.
#[allow(clippy::unused_async)]
pub async fn ping() -> &'static str {
    "pong"
}
