// Profiled - Profile registry service
// CRUD over profile records with an append-only status history

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod store;

pub use anyhow::{Context, Result};

// Re-export commonly used types
pub use config::{DatabaseLocation, ServerConfig, StatusTokenPolicy};
pub use error::{ProfileError, ProfileResult};
pub use models::{Profile, ProfileHistoryEntry, ProfileStatus};
pub use services::ProfileService;
pub use store::{ProfileStore, SqliteProfileStore};
