//! HTTP request handlers.

pub mod fallback;
pub mod health;
pub mod ping;

pub use fallback::not_found;
pub use health::{ComponentHealth, HealthReport, Status, health};
pub use ping::ping;
