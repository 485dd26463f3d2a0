//! Request authorization.
//!
//! A small allow-list of paths is reachable anonymously; every other request
//! must carry `Authorization: Bearer <token>` matching the configured API
//! token. Without a configured token, only the public paths are reachable.

use crate::error::AppError;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Paths that never require authentication.
pub const PUBLIC_PATHS: &[&str] = &["/ping", "/actuator/health"];

/// Authorization rules for the HTTP surface.
#[derive(Clone, Default)]
pub struct SecuritySettings {
    api_token: Option<String>,
}

impl std::fmt::Debug for SecuritySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecuritySettings")
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl SecuritySettings {
    /// Rules accepting `api_token` on non-public paths. Blank tokens are ignored.
    #[must_use]
    pub fn new(api_token: Option<String>) -> Self {
        Self {
            api_token: api_token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// `true` when `path` is on the anonymous allow-list.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        let path = path.trim_end_matches('/');
        PUBLIC_PATHS.contains(&path)
    }

    /// Decide whether a request with this `Authorization` header may proceed.
    ///
    /// # Errors
    ///
    /// Returns a 401 [`AppError`] when the header is missing, malformed, or
    /// carries the wrong token. The `Bearer` scheme matches in any case.
    pub fn authorize(&self, path: &str, authorization: Option<&str>) -> Result<(), AppError> {
        if self.is_public(path) {
            return Ok(());
        }

        let (_, token) = authorization
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?
            .split_once(' ')
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("Bearer"))
            .ok_or_else(|| AppError::unauthorized("Expected 'Bearer <token>'"))?;
        let token = token.trim();

        match &self.api_token {
            Some(expected) if constant_time_eq(expected.as_bytes(), token.as_bytes()) => Ok(()),
            _ => Err(AppError::unauthorized("Invalid bearer token")),
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0_u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Middleware enforcing [`SecuritySettings`].
///
/// # Errors
///
/// Rejects unauthorized requests with 401 before they reach routing.
pub async fn require_authentication(
    State(security): State<Arc<SecuritySettings>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if let Err(err) = security.authorize(request.uri().path(), authorization) {
        tracing::debug!(path = %request.uri().path(), "Rejected unauthenticated request");
        return Err(err);
    }

    Ok(next.run(request).await)
}
