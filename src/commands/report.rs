//! Health report page.

use std::sync::Arc;

use tauri::State;

use crate::core_state::CoreState;
use crate::report::{self, RenderedReport};

/// Resolve and render the report page (full, basic, or the no-reports
/// call-to-action).
#[tauri::command]
pub fn load_report(state: State<'_, Arc<CoreState>>) -> Result<RenderedReport, String> {
    let user_id = state.require_user_id().map_err(|e| e.to_string())?;
    let store = state.store_client().map_err(|e| e.to_string())?;

    let rendered = report::load_report_page(state.backend(), &store, state.sessions(), &user_id)
        .map_err(|e| e.to_string())?;
    // The handoff key was consumed on disk; refresh the mirror.
    state.refresh_session();
    Ok(rendered)
}
