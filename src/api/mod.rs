//! HTTP surface.
//!
//! Routes are nested under `/api/` and, apart from registration,
//! login and the health check, protected by bearer-token auth. The
//! router is composable — `api_router()` returns a `Router` that can
//! be mounted on any axum server.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod types;

pub use router::api_router;
pub use types::ApiContext;
