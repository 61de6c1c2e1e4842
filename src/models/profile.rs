use super::history::{ProfileHistoryEntry, StatusChange};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Store-assigned profile identifier
pub type ProfileId = i64;

/// Lifecycle status of a profile
///
/// There are no forbidden transitions: any status can follow any other.
/// `Deleted` is terminal in practice because deletion removes the row.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
    Deleted,
}

impl ProfileStatus {
    pub const ALL: [ProfileStatus; 4] = [
        ProfileStatus::Active,
        ProfileStatus::Inactive,
        ProfileStatus::Suspended,
        ProfileStatus::Deleted,
    ];

    /// Storage and wire token
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileStatus::Active => "active",
            ProfileStatus::Inactive => "inactive",
            ProfileStatus::Suspended => "suspended",
            ProfileStatus::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status token that does not name any [`ProfileStatus`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognized profile status '{0}' (expected one of: active, inactive, suspended, deleted)")]
pub struct ParseStatusError(pub String);

impl FromStr for ProfileStatus {
    type Err = ParseStatusError;

    /// Case-insensitive: "INACTIVE", "Inactive" and "inactive" all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProfileStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// A profile record together with its status history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    pub email: String,
    pub specialty: String,
    pub linkedin: Option<String>,
    pub status: ProfileStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,

    /// Status history, oldest first
    #[serde(default)]
    pub history: Vec<ProfileHistoryEntry>,
}

impl Profile {
    /// Status of the most recent history entry
    pub fn last_recorded_status(&self) -> Option<ProfileStatus> {
        self.history.last().map(|entry| entry.status)
    }

    /// Move to `status` if it differs from the current one.
    ///
    /// Returns the change to record, or `None` when nothing changed. The
    /// returned change is not yet part of `history`; the store assigns the
    /// entry id when it persists it.
    pub fn transition(&mut self, status: ProfileStatus, at: DateTime<Utc>) -> Option<StatusChange> {
        if self.status == status {
            return None;
        }

        self.status = status;
        self.end_date = match status {
            ProfileStatus::Deleted => Some(at),
            _ => None,
        };

        Some(StatusChange {
            status,
            changed_at: at,
        })
    }

    /// Apply the non-empty fields of `changes`, then its status.
    ///
    /// Returns the status change to record, if any.
    pub fn apply(&mut self, changes: &ProfileChanges, at: DateTime<Utc>) -> Option<StatusChange> {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(email) = &changes.email {
            self.email = email.clone();
        }
        if let Some(specialty) = &changes.specialty {
            self.specialty = specialty.clone();
        }
        if let Some(linkedin) = &changes.linkedin {
            self.linkedin = Some(linkedin.clone());
        }

        changes.status.and_then(|status| self.transition(status, at))
    }

    /// Final transition before removal.
    ///
    /// Always yields a `Deleted` change and stamps `end_date`, even when the
    /// status already was `Deleted`.
    pub fn mark_deleted(&mut self, at: DateTime<Utc>) -> StatusChange {
        self.status = ProfileStatus::Deleted;
        self.end_date = Some(at);
        StatusChange::new(ProfileStatus::Deleted, at)
    }
}

/// Fields of a profile that does not exist yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProfile {
    pub name: String,
    pub email: String,
    pub specialty: String,
    #[serde(default)]
    pub linkedin: Option<String>,
}

/// Partial update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub specialty: Option<String>,
    pub linkedin: Option<String>,
    pub status: Option<ProfileStatus>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.specialty.is_none()
            && self.linkedin.is_none()
            && self.status.is_none()
    }
}
