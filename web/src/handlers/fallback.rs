//! Unmatched routes.

use crate::error::AppError;
use axum::http::Uri;

/// Fallback for every path without a route. Reached only by authorized
/// callers; anonymous ones are stopped earlier with 401.
#[allow(clippy::unused_async)]
pub async fn not_found(uri: Uri) -> AppError {
    AppError::not_found(uri.path())
}
