//! Profile lifecycle service - status state machine and audit trail
//!
//! Every status the profile takes is recorded once in its history:
//! creation records `active`, an update records the new status only when it
//! differs from the current one, and deletion records `deleted` right before
//! the profile (and with it the history) is removed from the store.

use crate::config::StatusTokenPolicy;
use crate::error::{ProfileError, ProfileResult};
use crate::models::{
    NewProfile, Profile, ProfileChanges, ProfileHistoryEntry, ProfileId, ProfileStatus,
    StatusChange,
};
use crate::store::{Page, ProfileStore};
use chrono::Utc;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info, warn};

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s.]+$";

/// Business-rule layer over a [`ProfileStore`]
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Create an active profile and record its initial status
    pub fn create(&self, input: NewProfile) -> ProfileResult<Profile> {
        validate_required("name", &input.name)?;
        validate_required("specialty", &input.specialty)?;
        validate_email(&input.email)?;

        let initial = StatusChange::new(ProfileStatus::Active, Utc::now());
        let profile = self.store.insert(&input, initial)?;

        info!(profile_id = profile.id, email = %profile.email, "Profile created");
        Ok(profile)
    }

    pub fn get(&self, id: ProfileId) -> ProfileResult<Profile> {
        debug!(profile_id = id, "Fetching profile");
        self.store.get(id)?.ok_or(ProfileError::NotFound(id))
    }

    /// Profiles in insertion order; `limit` is capped by the store
    pub fn list(&self, skip: u32, limit: u32) -> ProfileResult<Vec<Profile>> {
        debug!(skip, limit, "Listing profiles");
        self.store.list(Page::new(skip, limit))
    }

    /// Apply the non-empty fields of `changes`.
    ///
    /// The store loads, applies and persists in one transaction, so a status
    /// equal to the current one is a no-op and adds no history even when
    /// updates race.
    pub fn update(&self, id: ProfileId, changes: ProfileChanges) -> ProfileResult<Profile> {
        if let Some(name) = &changes.name {
            validate_required("name", name)?;
        }
        if let Some(email) = &changes.email {
            validate_email(email)?;
        }
        if let Some(specialty) = &changes.specialty {
            validate_required("specialty", specialty)?;
        }

        let updated = self.store.update(id, &changes, Utc::now())?;

        info!(
            profile_id = id,
            status = %updated.status,
            history_len = updated.history.len(),
            "Profile updated"
        );
        Ok(updated)
    }

    /// Mark the profile deleted, record it, then remove it.
    ///
    /// Returns the snapshot taken just before removal.
    pub fn delete(&self, id: ProfileId) -> ProfileResult<Profile> {
        let snapshot = self.store.delete(id, Utc::now())?;

        info!(profile_id = id, "Profile deleted");
        Ok(snapshot)
    }

    pub fn history(&self, id: ProfileId) -> ProfileResult<Vec<ProfileHistoryEntry>> {
        Ok(self.get(id)?.history)
    }

    pub fn max_page_size(&self) -> u32 {
        self.store.max_page_size()
    }
}

/// Turn a raw status token from a request into a status.
///
/// Empty tokens count as absent. Unrecognized tokens are dropped with a
/// warning under [`StatusTokenPolicy::Ignore`] and rejected under
/// [`StatusTokenPolicy::Reject`].
pub fn resolve_status(
    token: Option<&str>,
    policy: StatusTokenPolicy,
) -> ProfileResult<Option<ProfileStatus>> {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    match token.parse::<ProfileStatus>() {
        Ok(status) => Ok(Some(status)),
        Err(err) => match policy {
            StatusTokenPolicy::Ignore => {
                warn!(token, "Ignoring unrecognized status token");
                Ok(None)
            }
            StatusTokenPolicy::Reject => Err(err.into()),
        },
    }
}

pub fn validate_email(email: &str) -> ProfileResult<()> {
    let valid = Regex::new(EMAIL_PATTERN)
        .map(|re| re.is_match(email))
        .unwrap_or(false);
    if valid {
        Ok(())
    } else {
        Err(ProfileError::validation(format!(
            "'{}' is not a valid email address",
            email
        )))
    }
}

fn validate_required(field: &str, value: &str) -> ProfileResult<()> {
    if value.trim().is_empty() {
        return Err(ProfileError::validation(format!("{} must not be empty", field)));
    }
    Ok(())
}
