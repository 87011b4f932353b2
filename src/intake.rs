//! Voice intake flow: transcription, symptom extraction, ailment
//! prediction, and the page state that threads them together.
//!
//! The flow is strictly staged. A confirmed recording produces a
//! transcript; a non-empty transcript can be analyzed into symptoms;
//! a non-empty symptom list is persisted (capturing the symptom id the
//! rest of the flow hangs on) and can be fed to the predictor; a saved
//! symptom record can seed report generation. Each stage validates
//! locally before any network call.

use serde::Serialize;
use tracing::{info, warn};

use crate::activity;
use crate::backend::{BackendApi, BackendError, GeneratedReport, TranscribeMeta};
use crate::firestore::DocumentStore;
use crate::models::{ActivityKind, Prediction};
use crate::recorder::ConfirmedRecording;
use crate::session_store::SessionStore;

/// Placeholder shown when analysis finds nothing actionable.
pub const NO_SYMPTOMS_PLACEHOLDER: &str = "No symptoms found.";

/// Transcript text substituted when the service rejects the audio.
pub const TRANSCRIPTION_FAILED_TEXT: &str = "Transcription failed.";

/// Upload filename the transcription service expects.
const UPLOAD_FILENAME: &str = "voice-input";

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

/// Errors surfaced by the intake stages. Display strings are the exact
/// texts the page shows.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    /// The upload never produced a response (connection or client
    /// failure). A rejected response is not this: it becomes the fixed
    /// placeholder transcript instead.
    #[error("Failed to save or transcribe recording.")]
    UploadFailed,
    #[error("No transcript to analyze.")]
    EmptyTranscript,
    #[error("No symptoms to analyze.")]
    NoSymptoms,
    #[error("No saved symptom record to generate a report from.")]
    MissingSymptomId,
    #[error("{0}")]
    Backend(#[from] crate::backend::BackendError),
}

// ═══════════════════════════════════════════════════════════
// Page state
// ═══════════════════════════════════════════════════════════

/// Mutable state of the voice-intake page for one visit.
#[derive(Debug, Default)]
pub struct IntakeSession {
    pub transcript: String,
    pub symptoms: Vec<String>,
    /// Set once symptoms are persisted; keys prediction and generation.
    pub symptom_id: Option<String>,
    pub prediction: Option<Prediction>,
    /// Blob of the confirmed recording, forwarded on save.
    audio_url: String,
}

impl IntakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset everything the page accumulated.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Result of the analyze stage, shaped for the page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOutcome {
    pub symptoms: Vec<String>,
    /// Set instead of symptoms when nothing was found.
    pub placeholder: Option<String>,
    /// Whether the predict action should be offered.
    pub predict_enabled: bool,
    pub symptom_id: Option<String>,
}

// ═══════════════════════════════════════════════════════════
// Stages
// ═══════════════════════════════════════════════════════════

/// Upload the confirmed recording for transcription.
///
/// The payload keeps the historical single-chunk shape: one base64
/// data-URL in `audio_chunks`, with a fixed filename and the capture
/// timestamp in milliseconds. A non-success response becomes the
/// literal "Transcription failed." transcript (the flow continues);
/// only a transport failure surfaces as an error. Success records a
/// `voice_input` activity.
pub fn transcribe(
    backend: &dyn BackendApi,
    store: &dyn DocumentStore,
    session: &mut IntakeSession,
    user_id: &str,
    recording: &ConfirmedRecording,
) -> Result<String, IntakeError> {
    let meta = TranscribeMeta {
        filename: UPLOAD_FILENAME.to_string(),
        timestamp: recording.started_at.timestamp_millis(),
    };
    let chunks = [recording.data_url.clone()];

    let text = match backend.transcribe(user_id, &chunks, &meta) {
        Ok(text) => text,
        Err(e @ (BackendError::Status { .. } | BackendError::NotFound)) => {
            // The service answered but rejected the audio: the fixed
            // text fills the transcript field and the page moves on.
            warn!("Transcription rejected: {e}");
            session.transcript = TRANSCRIPTION_FAILED_TEXT.to_string();
            return Ok(TRANSCRIPTION_FAILED_TEXT.to_string());
        }
        Err(e) => {
            warn!("Transcription request failed: {e}");
            return Err(IntakeError::UploadFailed);
        }
    };

    info!(chars = text.len(), "Transcription complete");
    session.transcript = text.clone();
    session.audio_url = recording.data_url.clone();
    activity::log_activity(
        store,
        user_id,
        ActivityKind::VoiceInput,
        "Recorded voice symptoms for analysis",
    );
    Ok(text)
}

/// Extract symptoms from the current transcript and, when any were
/// found, persist the record and capture its id.
pub fn analyze(
    backend: &dyn BackendApi,
    store: &dyn DocumentStore,
    session: &mut IntakeSession,
    user_id: &str,
) -> Result<AnalyzeOutcome, IntakeError> {
    let transcript = session.transcript.trim().to_string();
    if transcript.is_empty() {
        return Err(IntakeError::EmptyTranscript);
    }

    let symptoms = backend.analyze_symptoms(&transcript)?;
    if symptoms.is_empty() {
        session.symptoms.clear();
        session.symptom_id = None;
        return Ok(AnalyzeOutcome {
            symptoms: Vec::new(),
            placeholder: Some(NO_SYMPTOMS_PLACEHOLDER.to_string()),
            predict_enabled: false,
            symptom_id: None,
        });
    }

    let symptom_id = backend.save_symptoms(user_id, &transcript, &symptoms, &session.audio_url)?;
    info!(%symptom_id, count = symptoms.len(), "Symptoms saved");
    session.symptoms = symptoms.clone();
    session.symptom_id = Some(symptom_id.clone());
    activity::log_activity(
        store,
        user_id,
        ActivityKind::MedicalInfo,
        "User updated their medical info from voice input",
    );

    Ok(AnalyzeOutcome {
        symptoms,
        placeholder: None,
        predict_enabled: true,
        symptom_id: Some(symptom_id),
    })
}

/// Run the ailment predictor over the extracted symptoms.
pub fn predict(
    backend: &dyn BackendApi,
    session: &mut IntakeSession,
    user_id: &str,
) -> Result<Prediction, IntakeError> {
    if session.symptoms.is_empty() {
        return Err(IntakeError::NoSymptoms);
    }
    let prediction = backend.predict_ailment(
        user_id,
        &session.symptoms,
        session.symptom_id.as_deref(),
    )?;
    session.prediction = Some(prediction.clone());
    Ok(prediction)
}

/// Ask the backend for a report over the saved symptom record, then
/// stash its id in the one-shot handoff key so the report page picks it
/// up directly. A failed stash only costs the shortcut; the report page
/// falls back to the most-recent-record lookup.
pub fn generate_report(
    backend: &dyn BackendApi,
    session_store: &SessionStore,
    session: &IntakeSession,
    user_id: &str,
) -> Result<GeneratedReport, IntakeError> {
    let symptom_id = session
        .symptom_id
        .as_deref()
        .ok_or(IntakeError::MissingSymptomId)?;

    let generated = backend.generate_report(user_id, symptom_id)?;
    info!(report_id = %generated.report_id, existing = generated.existing, "Report ready");

    if let Err(e) = session_store.stash_latest_report_id(&generated.report_id) {
        warn!("Failed to stash report handoff key: {e}");
    }
    Ok(generated)
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeBackend, FakeStore};

    fn recording() -> ConfirmedRecording {
        ConfirmedRecording {
            recording_id: "rec-1".into(),
            data_url: "data:audio/webm;base64,aGVsbG8=".into(),
            started_at: chrono::Utc::now(),
            byte_len: 5,
        }
    }

    #[test]
    fn transcription_success_updates_session_and_logs_activity() {
        let backend = FakeBackend::new();
        *backend.transcript.lock().unwrap() = Some("I have a headache".into());
        let store = FakeStore::new();
        let mut session = IntakeSession::new();

        let text = transcribe(&backend, &store, &mut session, "u1", &recording()).unwrap();
        assert_eq!(text, "I have a headache");
        assert_eq!(session.transcript, "I have a headache");

        let activities = store.activities.lock().unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].kind, ActivityKind::VoiceInput);
    }

    #[test]
    fn rejected_transcription_becomes_fixed_transcript() {
        let backend = FakeBackend::new(); // transcript None → 500
        let store = FakeStore::new();
        let mut session = IntakeSession::new();

        let text = transcribe(&backend, &store, &mut session, "u1", &recording()).unwrap();
        assert_eq!(text, "Transcription failed.");
        assert_eq!(session.transcript, "Transcription failed.");
        // A rejected upload is not a recorded voice input.
        assert!(store.activities.lock().unwrap().is_empty());
    }

    #[test]
    fn transport_failure_surfaces_error_and_leaves_transcript() {
        let backend = FakeBackend::new();
        *backend.transcribe_connection_error.lock().unwrap() = true;
        let store = FakeStore::new();
        let mut session = IntakeSession::new();
        session.transcript = "earlier text".into();

        let err = transcribe(&backend, &store, &mut session, "u1", &recording()).unwrap_err();
        assert_eq!(err.to_string(), "Failed to save or transcribe recording.");
        assert_eq!(session.transcript, "earlier text");
        assert!(store.activities.lock().unwrap().is_empty());
    }

    #[test]
    fn activity_failure_does_not_fail_transcription() {
        let backend = FakeBackend::new();
        *backend.transcript.lock().unwrap() = Some("dizzy".into());
        let store = FakeStore::new();
        *store.fail.lock().unwrap() = true;
        let mut session = IntakeSession::new();

        assert!(transcribe(&backend, &store, &mut session, "u1", &recording()).is_ok());
    }

    #[test]
    fn analyze_rejects_blank_transcript_before_network() {
        let backend = FakeBackend::new();
        let store = FakeStore::new();
        let mut session = IntakeSession::new();
        session.transcript = "   \n".into();

        assert!(matches!(
            analyze(&backend, &store, &mut session, "u1"),
            Err(IntakeError::EmptyTranscript)
        ));
        assert!(backend.call_log().is_empty());
    }

    #[test]
    fn analyze_with_no_findings_shows_placeholder_and_hides_predict() {
        let backend = FakeBackend::new();
        let store = FakeStore::new();
        let mut session = IntakeSession::new();
        session.transcript = "just saying hi".into();

        let outcome = analyze(&backend, &store, &mut session, "u1").unwrap();
        assert!(outcome.symptoms.is_empty());
        assert_eq!(outcome.placeholder.as_deref(), Some("No symptoms found."));
        assert!(!outcome.predict_enabled);
        assert!(session.symptom_id.is_none());
        // Nothing to persist, so no save call and no activity.
        assert_eq!(backend.call_log(), vec!["analyze_symptoms"]);
        assert!(store.activities.lock().unwrap().is_empty());
    }

    #[test]
    fn analyze_persists_symptoms_and_captures_id() {
        let backend = FakeBackend::new();
        *backend.symptoms.lock().unwrap() = vec!["headache".into(), "fever".into()];
        let store = FakeStore::new();
        let mut session = IntakeSession::new();
        session.transcript = "I have a headache and fever".into();

        let outcome = analyze(&backend, &store, &mut session, "u1").unwrap();
        assert_eq!(outcome.symptoms, vec!["headache", "fever"]);
        assert!(outcome.predict_enabled);
        assert_eq!(outcome.symptom_id.as_deref(), Some("sym-1"));
        assert_eq!(session.symptom_id.as_deref(), Some("sym-1"));

        let activities = store.activities.lock().unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].kind, ActivityKind::MedicalInfo);
        assert_eq!(
            activities[0].details,
            "User updated their medical info from voice input"
        );
    }

    #[test]
    fn predict_refuses_empty_symptom_list() {
        let backend = FakeBackend::new();
        let mut session = IntakeSession::new();
        assert!(matches!(
            predict(&backend, &mut session, "u1"),
            Err(IntakeError::NoSymptoms)
        ));
        assert!(backend.call_log().is_empty());
    }

    #[test]
    fn predict_stores_result_in_session() {
        let backend = FakeBackend::new();
        let mut session = IntakeSession::new();
        session.symptoms = vec!["headache".into()];
        session.symptom_id = Some("sym-1".into());

        let prediction = predict(&backend, &mut session, "u1").unwrap();
        assert!(prediction.possible_ailments.is_empty());
        assert!(session.prediction.is_some());
    }

    #[test]
    fn generate_report_requires_saved_symptoms() {
        let backend = FakeBackend::new();
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("session.json"));
        let session = IntakeSession::new();

        assert!(matches!(
            generate_report(&backend, &store, &session, "u1"),
            Err(IntakeError::MissingSymptomId)
        ));
    }

    #[test]
    fn generate_report_stashes_handoff_key() {
        let backend = FakeBackend::new();
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("session.json"));
        let mut session = IntakeSession::new();
        session.symptom_id = Some("sym-42".into());

        let generated = generate_report(&backend, &store, &session, "u1").unwrap();
        assert_eq!(generated.report_id, "sym-42");
        assert_eq!(
            store.take_latest_report_id().unwrap().as_deref(),
            Some("sym-42")
        );
    }

    #[test]
    fn clear_resets_everything() {
        let mut session = IntakeSession::new();
        session.transcript = "text".into();
        session.symptoms = vec!["cough".into()];
        session.symptom_id = Some("sym-1".into());
        session.clear();
        assert!(session.transcript.is_empty());
        assert!(session.symptoms.is_empty());
        assert!(session.symptom_id.is_none());
        assert!(session.prediction.is_none());
    }
}
