//! Application state shared by handlers and middleware.

use crate::security::SecuritySettings;
use sqlx::PgPool;
use std::sync::Arc;

/// State shared across all HTTP handlers.
///
/// The pool is optional so the HTTP surface can be exercised without a
/// database; health then reports only the application itself.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    /// Connection pool backing persistence and the `db` health component.
    pub pool: Option<PgPool>,
    /// Authorization rules.
    pub security: Arc<SecuritySettings>,
    /// Hold one pooled connection for the lifetime of each request.
    pub open_in_view: bool,
}

impl AppState {
    /// State without a database.
    #[must_use]
    pub fn new(security: SecuritySettings) -> Self {
        Self {
            pool: None,
            security: Arc::new(security),
            open_in_view: false,
        }
    }

    /// Attach a connection pool.
    #[must_use]
    pub fn with_pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Enable or disable open-in-view.
    #[must_use]
    pub const fn with_open_in_view(mut self, enabled: bool) -> Self {
        self.open_in_view = enabled;
        self
    }
}
