//! Persisted session state.
//!
//! One JSON file under the app data directory holding the auth token,
//! the cached user profile, the remember-me flag, and the one-shot
//! report handoff key. Writes go through a temp file in the same
//! directory and an atomic rename, so a crash mid-write never leaves a
//! truncated session on disk.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config;
use crate::models::UserProfile;

// ═══════════════════════════════════════════════════════════
// Stored state
// ═══════════════════════════════════════════════════════════

/// Everything the client persists between launches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user_data: Option<UserProfile>,
    #[serde(default)]
    pub remember_me: bool,
    /// One-shot handoff key: set when report generation completes,
    /// consumed by the next report-page load.
    #[serde(default)]
    pub latest_report_id: Option<String>,
}

impl StoredSession {
    /// Whether a signed-in session is present.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The signed-in user's id, if any.
    pub fn user_id(&self) -> Option<&str> {
        self.user_data.as_ref().map(|u| u.uid.as_str())
    }
}

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

/// Errors from session persistence.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Failed to read session file: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to serialize session: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to persist session file: {0}")]
    Persist(String),
}

// ═══════════════════════════════════════════════════════════
// Store
// ═══════════════════════════════════════════════════════════

/// File-backed session store.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store rooted at the default app data directory.
    pub fn new() -> Self {
        Self {
            path: config::session_file(),
        }
    }

    /// Store rooted at an explicit path (tests).
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored session. A missing or unreadable file yields the
    /// signed-out default; corruption is logged, not fatal.
    pub fn load(&self) -> StoredSession {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return StoredSession::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(session) => session,
            Err(e) => {
                warn!("Discarding unreadable session file: {e}");
                StoredSession::default()
            }
        }
    }

    /// Write the session atomically.
    pub fn save(&self, session: &StoredSession) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;

        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path)
            .map_err(|e| SessionStoreError::Persist(e.to_string()))?;
        Ok(())
    }

    /// Remove the persisted session (sign-out).
    pub fn clear(&self) -> Result<(), SessionStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Stash the report handoff key.
    pub fn stash_latest_report_id(&self, report_id: &str) -> Result<(), SessionStoreError> {
        let mut session = self.load();
        session.latest_report_id = Some(report_id.to_string());
        self.save(&session)
    }

    /// Take the report handoff key, clearing it so a page refresh falls
    /// back to the most-recent-record lookup.
    pub fn take_latest_report_id(&self) -> Result<Option<String>, SessionStoreError> {
        let mut session = self.load();
        let id = session.latest_report_id.take();
        if id.is_some() {
            self.save(&session)?;
        }
        Ok(id)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("session.json"));
        (dir, store)
    }

    fn signed_in() -> StoredSession {
        StoredSession {
            token: Some("tok-123".into()),
            user_data: Some(UserProfile {
                uid: "u1".into(),
                name: "Jane Doe".into(),
                email: "jane@example.com".into(),
                ..Default::default()
            }),
            remember_me: true,
            latest_report_id: None,
        }
    }

    #[test]
    fn missing_file_loads_signed_out_default() {
        let (_dir, store) = temp_store();
        let session = store.load();
        assert!(!session.is_authenticated());
        assert!(session.user_id().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, store) = temp_store();
        store.save(&signed_in()).unwrap();

        let loaded = store.load();
        assert!(loaded.is_authenticated());
        assert_eq!(loaded.user_id(), Some("u1"));
        assert!(loaded.remember_me);
    }

    #[test]
    fn corrupt_file_loads_signed_out_default() {
        let (_dir, store) = temp_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{not json").unwrap();

        let session = store.load();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn clear_removes_file_and_is_idempotent() {
        let (_dir, store) = temp_store();
        store.save(&signed_in()).unwrap();
        store.clear().unwrap();
        assert!(!store.load().is_authenticated());
        store.clear().unwrap();
    }

    #[test]
    fn handoff_key_is_one_shot() {
        let (_dir, store) = temp_store();
        store.save(&signed_in()).unwrap();
        store.stash_latest_report_id("sym-42").unwrap();

        assert_eq!(store.take_latest_report_id().unwrap().as_deref(), Some("sym-42"));
        assert!(store.take_latest_report_id().unwrap().is_none());

        // Token survives the stash/take cycle.
        assert!(store.load().is_authenticated());
    }
}
