//! SQLite-backed profile store

use super::{Page, ProfileStore, DEFAULT_MAX_PAGE_SIZE};
use crate::error::{ProfileError, ProfileResult};
use crate::models::{
    NewProfile, Profile, ProfileChanges, ProfileHistoryEntry, ProfileId, ProfileStatus,
    StatusChange,
};
use anyhow::Context;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use tracing::debug;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS profiles (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL,
        email       TEXT NOT NULL UNIQUE,
        specialty   TEXT NOT NULL,
        linkedin    TEXT,
        status      TEXT NOT NULL
                    CHECK (status IN ('active', 'inactive', 'suspended', 'deleted')),
        start_date  TEXT NOT NULL,
        end_date    TEXT
    );

    CREATE TABLE IF NOT EXISTS profile_history (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        profile_id  INTEGER NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        status      TEXT NOT NULL
                    CHECK (status IN ('active', 'inactive', 'suspended', 'deleted')),
        changed_at  TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_profile_history_profile
        ON profile_history(profile_id, id);
";

const PROFILE_COLUMNS: &str =
    "id, name, email, specialty, linkedin, status, start_date, end_date";

impl ToSql for ProfileStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ProfileStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Profile store over a single SQLite connection.
///
/// The connection is locked for the duration of one operation, so every
/// operation sees and commits a consistent state.
pub struct SqliteProfileStore {
    conn: Mutex<Connection>,
    max_page_size: u32,
}

impl SqliteProfileStore {
    /// Open or create a database file, creating the schema if needed
    pub fn open(path: &Path) -> crate::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> crate::Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> crate::Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;
        conn.execute_batch(SCHEMA)
            .context("Failed to create profile schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        })
    }

    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size;
        self
    }
}

impl ProfileStore for SqliteProfileStore {
    fn insert(&self, profile: &NewProfile, initial: StatusChange) -> ProfileResult<Profile> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO profiles (name, email, specialty, linkedin, status, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL)",
            params![
                profile.name,
                profile.email,
                profile.specialty,
                profile.linkedin,
                initial.status,
                initial.changed_at,
            ],
        )
        .map_err(|e| map_write_error(e, &profile.email))?;

        let id = tx.last_insert_rowid();
        append_history(&tx, id, initial)?;

        let created = load_profile(&tx, id)?.ok_or(ProfileError::NotFound(id))?;
        tx.commit()?;

        debug!(profile_id = id, "Inserted profile");
        Ok(created)
    }

    fn get(&self, id: ProfileId) -> ProfileResult<Option<Profile>> {
        let conn = self.conn.lock();
        Ok(load_profile(&conn, id)?)
    }

    fn list(&self, page: Page) -> ProfileResult<Vec<Profile>> {
        let limit = page.limit.min(self.max_page_size);
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY id LIMIT ?1 OFFSET ?2"
        ))?;
        let mut profiles = stmt
            .query_map(params![i64::from(limit), i64::from(page.offset)], map_profile_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for profile in &mut profiles {
            profile.history = load_history(&conn, profile.id)?;
        }

        Ok(profiles)
    }

    fn update(
        &self,
        id: ProfileId,
        changes: &ProfileChanges,
        at: DateTime<Utc>,
    ) -> ProfileResult<Profile> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let mut profile = load_profile(&tx, id)?.ok_or(ProfileError::NotFound(id))?;
        let change = profile.apply(changes, at);

        tx.execute(
            "UPDATE profiles
             SET name = ?1, email = ?2, specialty = ?3, linkedin = ?4, status = ?5, end_date = ?6
             WHERE id = ?7",
            params![
                profile.name,
                profile.email,
                profile.specialty,
                profile.linkedin,
                profile.status,
                profile.end_date,
                id,
            ],
        )
        .map_err(|e| map_write_error(e, &profile.email))?;

        if let Some(change) = change {
            append_history(&tx, id, change)?;
            debug!(profile_id = id, status = %change.status, "Recorded status change");
        }

        let stored = load_profile(&tx, id)?.ok_or(ProfileError::NotFound(id))?;
        tx.commit()?;

        Ok(stored)
    }

    fn delete(&self, id: ProfileId, at: DateTime<Utc>) -> ProfileResult<Profile> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let mut profile = load_profile(&tx, id)?.ok_or(ProfileError::NotFound(id))?;
        let change = profile.mark_deleted(at);

        tx.execute(
            "UPDATE profiles SET status = ?1, end_date = ?2 WHERE id = ?3",
            params![profile.status, profile.end_date, id],
        )?;
        append_history(&tx, id, change)?;

        let snapshot = load_profile(&tx, id)?.ok_or(ProfileError::NotFound(id))?;

        // profile_history rows go with it via ON DELETE CASCADE
        tx.execute("DELETE FROM profiles WHERE id = ?1", params![id])?;
        tx.commit()?;

        Ok(snapshot)
    }

    fn history(&self, id: ProfileId) -> ProfileResult<Vec<ProfileHistoryEntry>> {
        let conn = self.conn.lock();
        Ok(load_history(&conn, id)?)
    }

    fn max_page_size(&self) -> u32 {
        self.max_page_size
    }
}

fn append_history(conn: &Connection, profile_id: ProfileId, change: StatusChange) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO profile_history (profile_id, status, changed_at) VALUES (?1, ?2, ?3)",
        params![profile_id, change.status, change.changed_at],
    )?;
    Ok(conn.last_insert_rowid())
}

fn load_profile(conn: &Connection, id: ProfileId) -> rusqlite::Result<Option<Profile>> {
    let profile = conn
        .query_row(
            &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"),
            params![id],
            map_profile_row,
        )
        .optional()?;

    match profile {
        Some(mut profile) => {
            profile.history = load_history(conn, id)?;
            Ok(Some(profile))
        }
        None => Ok(None),
    }
}

fn load_history(conn: &Connection, profile_id: ProfileId) -> rusqlite::Result<Vec<ProfileHistoryEntry>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, profile_id, status, changed_at FROM profile_history
         WHERE profile_id = ?1 ORDER BY id",
    )?;
    let entries = stmt
        .query_map(params![profile_id], |row| {
            Ok(ProfileHistoryEntry {
                id: row.get("id")?,
                profile_id: row.get("profile_id")?,
                status: row.get("status")?,
                changed_at: row.get("changed_at")?,
            })
        })?
        .collect();
    entries
}

fn map_profile_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        specialty: row.get("specialty")?,
        linkedin: row.get("linkedin")?,
        status: row.get("status")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        history: Vec::new(),
    })
}

/// Unique-email violations become validation errors; everything else is storage
fn map_write_error(err: rusqlite::Error, email: &str) -> ProfileError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, Some(message))
            if failure.code == ErrorCode::ConstraintViolation && message.contains("profiles.email") =>
        {
            ProfileError::validation(format!("Email '{}' is already registered", email))
        }
        _ => ProfileError::Storage(err),
    }
}
