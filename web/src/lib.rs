//! HTTP surface of the Pokédex inventory service.
//!
//! Provides the Axum router with its two public endpoints and the
//! middleware stack in front of them:
//!
//! ```text
//! TraceLayer ─▶ X-Request-ID ─▶ authorization ─▶ open-in-view ─▶ routes
//! ```
//!
//! | Route                  | Auth   | Response                        |
//! |------------------------|--------|---------------------------------|
//! | `GET /ping`            | public | `200 pong`                      |
//! | `GET /actuator/health` | public | `200 {"status":"UP"}` or `503`  |
//!
//! Every other path requires `Authorization: Bearer <token>`.
//!
//! # Example
//!
//! ```ignore
//! use inventory_web::{AppState, SecuritySettings, build_router};
//!
//! let state = AppState::new(SecuritySettings::new(Some(token))).with_pool(pool);
//! let app = build_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod security;
pub mod session;
pub mod state;

pub use error::AppError;
pub use middleware::{REQUEST_ID_HEADER, RequestId, request_id_layer};
pub use router::build_router;
pub use security::{PUBLIC_PATHS, SecuritySettings};
pub use session::RequestConnection;
pub use state::AppState;
