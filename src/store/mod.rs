//! Profile persistence
//!
//! The [`ProfileStore`] trait is the capability surface the lifecycle service
//! depends on. Every method that writes a profile row also writes the paired
//! history entry inside the same transaction, and read-modify-write steps
//! (update, delete) load the current row inside that transaction too.

mod sqlite;

pub use sqlite::SqliteProfileStore;

use crate::error::ProfileResult;
use crate::models::{
    NewProfile, Profile, ProfileChanges, ProfileHistoryEntry, ProfileId, StatusChange,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound applied to page sizes when none is configured
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Offset/limit window over the profile listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub offset: u32,
    pub limit: u32,
}

impl Page {
    pub fn new(offset: u32, limit: u32) -> Self {
        Self { offset, limit }
    }
}

pub trait ProfileStore: Send + Sync {
    /// Insert a profile and its first history entry.
    ///
    /// The profile takes `initial.status` and starts at `initial.changed_at`.
    fn insert(&self, profile: &NewProfile, initial: StatusChange) -> ProfileResult<Profile>;

    fn get(&self, id: ProfileId) -> ProfileResult<Option<Profile>>;

    /// Profiles in insertion order. `page.limit` is capped at
    /// [`ProfileStore::max_page_size`].
    fn list(&self, page: Page) -> ProfileResult<Vec<Profile>>;

    /// Load, apply `changes` and persist as one atomic step.
    ///
    /// A status change (see [`Profile::apply`]) is appended to the history
    /// in the same transaction, stamped `at`.
    fn update(
        &self,
        id: ProfileId,
        changes: &ProfileChanges,
        at: DateTime<Utc>,
    ) -> ProfileResult<Profile>;

    /// Record a final `deleted` entry stamped `at`, then remove the profile
    /// and its history. Returns the snapshot taken just before removal.
    fn delete(&self, id: ProfileId, at: DateTime<Utc>) -> ProfileResult<Profile>;

    fn history(&self, id: ProfileId) -> ProfileResult<Vec<ProfileHistoryEntry>>;

    fn max_page_size(&self) -> u32;
}
