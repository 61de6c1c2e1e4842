//! HTTP access layer
//!
//! Maps requests onto [`crate::services::ProfileService`] calls and lifecycle
//! errors onto status codes: not found is 404, validation is 400, a rejected
//! status token is 422 and storage failures are 500. Malformed requests keep
//! axum's status code but share the `{"detail": ...}` body.

pub mod error;
pub mod extract;
pub mod http_server;
pub mod schemas;

pub use error::ApiError;
pub use http_server::{router, start_server, AppState};
