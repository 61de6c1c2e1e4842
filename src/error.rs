//! Error types for profile lifecycle operations.

use crate::models::{ParseStatusError, ProfileId};

/// Result type for lifecycle and store operations
pub type ProfileResult<T> = std::result::Result<T, ProfileError>;

/// Errors raised by the lifecycle service and the profile store
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Profile not found: {0}")]
    NotFound(ProfileId),

    /// Duplicate email or a malformed field
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    InvalidStatusToken(#[from] ParseStatusError),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl ProfileError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ProfileError::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ProfileError::Validation(_))
    }
}
