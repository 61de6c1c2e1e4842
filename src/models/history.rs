use super::profile::{ProfileId, ProfileStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable audit record of one status value at a point in time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileHistoryEntry {
    pub id: i64,
    pub profile_id: ProfileId,
    pub status: ProfileStatus,
    pub changed_at: DateTime<Utc>,
}

/// A status change that has not been persisted yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub status: ProfileStatus,
    pub changed_at: DateTime<Utc>,
}

impl StatusChange {
    pub fn new(status: ProfileStatus, changed_at: DateTime<Utc>) -> Self {
        Self { status, changed_at }
    }
}
