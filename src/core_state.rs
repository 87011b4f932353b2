//! Shared application state behind the IPC commands.
//!
//! One `CoreState` lives for the life of the app, managed by the Tauri
//! builder. Page-scoped mutable state (the recorder, the intake
//! session, the gate) sits behind mutexes; the persisted session is
//! mirrored into a `RwLock` so reads don't hit the disk. The Firebase
//! bootstrap (`GET /firebase-config`) is fetched once and cached.

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use crate::auth::FirebaseAuthClient;
use crate::backend::{BackendApi, BackendClient, FirebaseConfig};
use crate::firestore::FirestoreClient;
use crate::intake::IntakeSession;
use crate::recorder::Recorder;
use crate::session_gate::SessionGate;
use crate::session_store::{SessionStore, StoredSession};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("You must be signed in.")]
    NotSignedIn,
    #[error("{0}")]
    Backend(#[from] crate::backend::BackendError),
}

pub struct CoreState {
    backend: Box<dyn BackendApi + Send + Sync>,
    sessions: SessionStore,
    session: RwLock<StoredSession>,
    gate: Mutex<SessionGate>,
    recorder: Mutex<Recorder>,
    intake: Mutex<IntakeSession>,
    firebase: Mutex<Option<FirebaseConfig>>,
}

impl CoreState {
    /// Production wiring: relay client from config, session file under
    /// the app data directory.
    pub fn new() -> Self {
        Self::with_parts(Box::new(BackendClient::from_config()), SessionStore::new())
    }

    /// Explicit wiring (tests inject fakes here).
    pub fn with_parts(backend: Box<dyn BackendApi + Send + Sync>, sessions: SessionStore) -> Self {
        let session = sessions.load();
        Self {
            backend,
            sessions,
            session: RwLock::new(session),
            gate: Mutex::new(SessionGate::new()),
            recorder: Mutex::new(Recorder::new()),
            intake: Mutex::new(IntakeSession::new()),
            firebase: Mutex::new(None),
        }
    }

    pub fn backend(&self) -> &dyn BackendApi {
        self.backend.as_ref()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    // ── Session mirror ───────────────────────────────────

    /// Snapshot of the current session.
    pub fn session(&self) -> StoredSession {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Re-read the persisted session into the mirror (after login,
    /// logout, or a handoff-key update).
    pub fn refresh_session(&self) {
        let fresh = self.sessions.load();
        *self
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner) = fresh;
    }

    /// The signed-in user's id, or the signed-out error.
    pub fn require_user_id(&self) -> Result<String, CoreError> {
        self.session()
            .user_id()
            .map(str::to_string)
            .ok_or(CoreError::NotSignedIn)
    }

    fn require_token(&self) -> Result<String, CoreError> {
        self.session().token.ok_or(CoreError::NotSignedIn)
    }

    // ── Firebase bootstrap ───────────────────────────────

    /// The `/firebase-config` bootstrap, fetched once per run.
    pub fn firebase_config(&self) -> Result<FirebaseConfig, CoreError> {
        let mut cached = self
            .firebase
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(config) = cached.as_ref() {
            return Ok(config.clone());
        }
        let config = self.backend.firebase_config()?;
        *cached = Some(config.clone());
        Ok(config)
    }

    /// Identity-provider client from the bootstrap credentials.
    pub fn auth_client(&self) -> Result<FirebaseAuthClient, CoreError> {
        let config = self.firebase_config()?;
        Ok(FirebaseAuthClient::new(&config.api_key))
    }

    /// Document-store client bound to the signed-in user's token.
    pub fn store_client(&self) -> Result<FirestoreClient, CoreError> {
        let config = self.firebase_config()?;
        let token = self.require_token()?;
        Ok(FirestoreClient::new(&config.project_id, &token))
    }

    /// Document-store client for a just-issued token (login completes
    /// before the session mirror knows about it).
    pub fn store_client_for(&self, id_token: &str) -> Result<FirestoreClient, CoreError> {
        let config = self.firebase_config()?;
        Ok(FirestoreClient::new(&config.project_id, id_token))
    }

    // ── Page-scoped state ────────────────────────────────

    pub fn gate(&self) -> MutexGuard<'_, SessionGate> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn recorder(&self) -> MutexGuard<'_, Recorder> {
        self.recorder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn intake(&self) -> MutexGuard<'_, IntakeSession> {
        self.intake.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self::new()
    }
}
