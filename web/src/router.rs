//! Router assembly.

use crate::{
    handlers::{health, not_found, ping},
    middleware::request_id_layer,
    security::require_authentication,
    session::hold_connection,
    state::AppState,
};
use axum::{Router, middleware::from_fn_with_state, routing::get};
use tower_http::trace::TraceLayer;

/// Build the HTTP surface.
///
/// Layer order, outermost first: tracing, request ID, authorization,
/// open-in-view, routes. Unknown paths fall through to a 404 only after
/// authorization has passed.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/actuator/health", get(health))
        .fallback(not_found)
        .layer(from_fn_with_state(state.clone(), hold_connection))
        .layer(from_fn_with_state(
            state.security.clone(),
            require_authentication,
        ))
        .layer(request_id_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::{middleware::REQUEST_ID_HEADER, security::SecuritySettings};
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    fn app() -> Router {
        build_router(AppState::new(SecuritySettings::new(Some("token".into()))))
    }

    #[tokio::test]
    async fn test_ping_is_public() {
        let response = app()
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn test_unknown_path_needs_token_before_404() {
        let anonymous = app()
            .oneshot(Request::builder().uri("/pokemon").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let authorized = app()
            .oneshot(
                Request::builder()
                    .uri("/pokemon")
                    .header(header::AUTHORIZATION, "Bearer token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(authorized.status(), StatusCode::NOT_FOUND);
        assert!(!authorized.headers().contains_key(header::WWW_AUTHENTICATE));
    }
}
