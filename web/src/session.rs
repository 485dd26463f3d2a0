//! Open-in-view: one pooled connection per request.
//!
//! When enabled, a connection is checked out before the handler runs and
//! returned to the pool once the request (and thus its extensions) is
//! dropped. Handlers reach it through the [`RequestConnection`] extractor.

use crate::{error::AppError, state::AppState};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use sqlx::{Postgres, pool::PoolConnection};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Connection bound to the current request.
#[derive(Clone, Debug)]
pub struct RequestConnection(Arc<Mutex<PoolConnection<Postgres>>>);

impl RequestConnection {
    /// Exclusive access to the connection.
    pub async fn lock(&self) -> MutexGuard<'_, PoolConnection<Postgres>> {
        self.0.lock().await
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestConnection
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| AppError::internal("open-in-view is disabled"))
    }
}

/// Middleware checking out a connection for the request when open-in-view
/// is enabled and a pool is attached.
///
/// # Errors
///
/// Responds 503 when no connection can be acquired.
pub async fn hold_connection(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(pool) = state.pool.as_ref().filter(|_| state.open_in_view) else {
        return Ok(next.run(request).await);
    };

    let connection = pool.acquire().await.map_err(|e| {
        AppError::unavailable("Database connection unavailable").with_source(e)
    })?;
    tracing::trace!("Bound pooled connection to request");

    request
        .extensions_mut()
        .insert(RequestConnection(Arc::new(Mutex::new(connection))));

    Ok(next.run(request).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, middleware::from_fn_with_state, routing::get};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_passthrough_without_pool() {
        let state = AppState::default().with_open_in_view(true);
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(from_fn_with_state(state.clone(), hold_connection))
            .with_state(state);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_extractor_rejects_when_not_bound() {
        let app = Router::new().route("/", get(|_conn: RequestConnection| async { "bound" }));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
