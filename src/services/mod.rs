//! Service layer for profiled
//!
//! Business rules shared by the HTTP API and the CLI, so both access paths
//! go through the same lifecycle checks.

pub mod profile_service;

pub use profile_service::{resolve_status, validate_email, ProfileService};
