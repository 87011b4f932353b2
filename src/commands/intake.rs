//! Voice intake page: recorder lifecycle and the relay stages.

use std::sync::Arc;

use serde::Serialize;
use tauri::State;

use crate::core_state::CoreState;
use crate::intake::{self, AnalyzeOutcome};
use crate::models::Prediction;

/// Begin a take; returns the recording id.
#[tauri::command]
pub fn start_recording(state: State<'_, Arc<CoreState>>) -> Result<String, String> {
    state.recorder().start().map_err(|e| e.to_string())
}

/// Buffer one pushed chunk; returns visualizer samples for it.
#[tauri::command]
pub fn push_audio_chunk(
    chunk: String,
    state: State<'_, Arc<CoreState>>,
) -> Result<Vec<f32>, String> {
    state
        .recorder()
        .push_chunk(&chunk)
        .map_err(|e| e.to_string())
}

/// End the take; the blob is held for confirm or discard.
#[tauri::command]
pub fn stop_recording(state: State<'_, Arc<CoreState>>) -> Result<(), String> {
    state.recorder().stop().map_err(|e| e.to_string())
}

/// Drop the held take.
#[tauri::command]
pub fn discard_recording(state: State<'_, Arc<CoreState>>) -> Result<(), String> {
    state.recorder().discard().map_err(|e| e.to_string())
}

/// The capture device failed (typically mic permission denied).
#[tauri::command]
pub fn report_capture_failure(
    reason: String,
    state: State<'_, Arc<CoreState>>,
) -> Result<(), String> {
    Err(state.recorder().capture_failed(&reason).to_string())
}

/// Confirm the held take and upload it for transcription.
#[tauri::command]
pub fn confirm_recording(state: State<'_, Arc<CoreState>>) -> Result<String, String> {
    let user_id = state.require_user_id().map_err(|e| e.to_string())?;
    let store = state.store_client().map_err(|e| e.to_string())?;
    let recording = state.recorder().confirm().map_err(|e| e.to_string())?;

    let mut session = state.intake();
    intake::transcribe(state.backend(), &store, &mut session, &user_id, &recording)
        .map_err(|e| e.to_string())
}

/// Extract symptoms from the transcript and persist them when found.
#[tauri::command]
pub fn analyze_transcript(state: State<'_, Arc<CoreState>>) -> Result<AnalyzeOutcome, String> {
    let user_id = state.require_user_id().map_err(|e| e.to_string())?;
    let store = state.store_client().map_err(|e| e.to_string())?;

    let mut session = state.intake();
    intake::analyze(state.backend(), &store, &mut session, &user_id).map_err(|e| e.to_string())
}

/// Run the ailment predictor over the extracted symptoms.
#[tauri::command]
pub fn predict_ailment(state: State<'_, Arc<CoreState>>) -> Result<Prediction, String> {
    let user_id = state.require_user_id().map_err(|e| e.to_string())?;
    let mut session = state.intake();
    intake::predict(state.backend(), &mut session, &user_id).map_err(|e| e.to_string())
}

/// Report generation result, with the page the frontend moves to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedReportInfo {
    pub report_id: String,
    pub existing: bool,
    pub redirect: String,
}

/// Generate a report over the saved symptom record and stash the
/// handoff key for the report page.
#[tauri::command]
pub fn generate_health_report(
    state: State<'_, Arc<CoreState>>,
) -> Result<GeneratedReportInfo, String> {
    let user_id = state.require_user_id().map_err(|e| e.to_string())?;
    let session = state.intake();
    let generated = intake::generate_report(state.backend(), state.sessions(), &session, &user_id)
        .map_err(|e| e.to_string())?;
    drop(session);
    state.refresh_session();

    Ok(GeneratedReportInfo {
        report_id: generated.report_id,
        existing: generated.existing,
        redirect: "report.html".to_string(),
    })
}

/// Reset the page state (transcript, symptoms, rendered results).
#[tauri::command]
pub fn clear_intake(state: State<'_, Arc<CoreState>>) {
    state.intake().clear();
}
