//! API route handlers
//!
//! - `books`: the `/books` CRUD resource
//! - `health`: liveness and readiness probes

pub mod books;
pub mod health;

use crate::error::ServerError;

/// 404 Not Found handler
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::RouteNotFound
}
