//! Actuator health endpoint.
//!
//! Used by load balancers and test suites to verify the service is up.
//! When a database is attached its reachability is reported as the `db`
//! component and decides the overall status. With open-in-view on, the
//! probe runs on the connection already bound to the request.

use crate::{session::RequestConnection, state::AppState};
use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// How long the database probe may take before it counts as down.
const DB_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Overall or per-component status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Healthy.
    Up,
    /// Unreachable or failing.
    Down,
}

/// Health of one dependency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component status.
    pub status: Status,
    /// Failure detail, when down.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `GET /actuator/health`.
///
/// ```json
/// { "status": "UP", "components": { "db": { "status": "UP" } } }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Aggregate status.
    pub status: Status,
    /// Per-dependency detail.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub components: BTreeMap<String, ComponentHealth>,
}

/// `GET /actuator/health`
///
/// # Status Codes
///
/// - 200 OK: every component is up
/// - 503 Service Unavailable: some component is down
pub async fn health(
    State(state): State<AppState>,
    connection: Option<RequestConnection>,
) -> (StatusCode, Json<HealthReport>) {
    let mut components = BTreeMap::new();

    if let Some(pool) = &state.pool {
        let probe = async {
            if let Some(connection) = &connection {
                let mut held = connection.lock().await;
                inventory_postgres::ping(&mut **held).await
            } else {
                inventory_postgres::ping(pool).await
            }
        };
        let db = match tokio::time::timeout(DB_PROBE_TIMEOUT, probe).await {
            Ok(Ok(())) => ComponentHealth {
                status: Status::Up,
                error: None,
            },
            Ok(Err(e)) => ComponentHealth {
                status: Status::Down,
                error: Some(e.to_string()),
            },
            Err(_) => ComponentHealth {
                status: Status::Down,
                error: Some("database probe timed out".to_string()),
            },
        };
        components.insert("db".to_string(), db);
    }

    let status = if components.values().all(|c| c.status == Status::Up) {
        Status::Up
    } else {
        tracing::warn!(?components, "Health check reports DOWN");
        Status::Down
    };

    let code = match status {
        Status::Up => StatusCode::OK,
        Status::Down => StatusCode::SERVICE_UNAVAILABLE,
    };

    (code, Json(HealthReport { status, components }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_without_database_is_up() {
        let (code, Json(report)) = health(State(AppState::default()), None).await;

        assert_eq!(code, StatusCode::OK);
        assert_eq!(report.status, Status::Up);
        assert!(report.components.is_empty());
    }

    #[test]
    fn test_report_serializes_uppercase() {
        let mut components = BTreeMap::new();
        components.insert(
            "db".to_string(),
            ComponentHealth {
                status: Status::Down,
                error: Some("refused".to_string()),
            },
        );
        let report = HealthReport {
            status: Status::Down,
            components,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "DOWN",
                "components": { "db": { "status": "DOWN", "error": "refused" } }
            })
        );
    }

    #[test]
    fn test_bare_report_omits_components() {
        let report = HealthReport {
            status: Status::Up,
            components: BTreeMap::new(),
        };
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"status":"UP"}"#
        );
    }
}
