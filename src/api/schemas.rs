//! Request and response bodies for the HTTP API

use crate::models::{NewProfile, Profile, ProfileHistoryEntry, ProfileId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /profiles/`
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileCreate {
    pub name: String,
    pub email: String,
    pub specialty: String,
    #[serde(default)]
    pub linkedin: Option<String>,
}

impl From<ProfileCreate> for NewProfile {
    fn from(body: ProfileCreate) -> Self {
        Self {
            name: body.name,
            email: body.email,
            specialty: body.specialty,
            linkedin: body.linkedin,
        }
    }
}

/// Body of `PUT /profiles/{id}`; every field is optional.
///
/// `status` stays a raw token here so the configured status policy decides
/// what happens to values that are not valid statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Query string of `GET /profiles/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

/// Profile as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileResponse {
    pub id: ProfileId,
    pub name: String,
    pub email: String,
    pub specialty: String,
    pub linkedin: Option<String>,
    pub status: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

impl From<&Profile> for ProfileResponse {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            name: profile.name.clone(),
            email: profile.email.clone(),
            specialty: profile.specialty.clone(),
            linkedin: profile.linkedin.clone(),
            status: profile.status.to_string(),
            start_date: profile.start_date,
            end_date: profile.end_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntryResponse {
    pub id: i64,
    pub profile_id: ProfileId,
    pub status: String,
    pub changed_at: DateTime<Utc>,
}

impl From<&ProfileHistoryEntry> for HistoryEntryResponse {
    fn from(entry: &ProfileHistoryEntry) -> Self {
        Self {
            id: entry.id,
            profile_id: entry.profile_id,
            status: entry.status.to_string(),
            changed_at: entry.changed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
