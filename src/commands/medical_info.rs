//! Medical information page.

use std::sync::Arc;

use tauri::State;

use crate::core_state::CoreState;
use crate::medical_info::{self, SaveOutcome};
use crate::models::MedicalInformation;

/// Load the user's document into the form; missing documents come back
/// empty.
#[tauri::command]
pub fn load_medical_info(state: State<'_, Arc<CoreState>>) -> Result<MedicalInformation, String> {
    let user_id = state.require_user_id().map_err(|e| e.to_string())?;
    let store = state.store_client().map_err(|e| e.to_string())?;
    medical_info::load(&store, &user_id).map_err(|e| e.to_string())
}

/// Merge-upsert the form contents.
#[tauri::command]
pub fn save_medical_info(
    info: MedicalInformation,
    state: State<'_, Arc<CoreState>>,
) -> Result<SaveOutcome, String> {
    let user_id = state.require_user_id().map_err(|e| e.to_string())?;
    let store = state.store_client().map_err(|e| e.to_string())?;
    medical_info::save(&store, &user_id, &info).map_err(|e| e.to_string())
}
