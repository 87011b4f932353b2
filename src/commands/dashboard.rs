//! Dashboard page: trends, summary panel, activity feed, greeting.

use std::sync::Arc;

use tauri::State;

use crate::activity::FeedItem;
use crate::core_state::CoreState;
use crate::dashboard::{self, DashboardSummary, SymptomTrends};

/// Chart-ready symptom trend series.
#[tauri::command]
pub fn symptom_trends(state: State<'_, Arc<CoreState>>) -> Result<SymptomTrends, String> {
    let user_id = state.require_user_id().map_err(|e| e.to_string())?;
    let store = state.store_client().map_err(|e| e.to_string())?;
    dashboard::load_trends(&store, &user_id).map_err(|e| e.to_string())
}

/// Condensed panel from the most recent report.
#[tauri::command]
pub fn dashboard_summary(state: State<'_, Arc<CoreState>>) -> Result<DashboardSummary, String> {
    let user_id = state.require_user_id().map_err(|e| e.to_string())?;
    let store = state.store_client().map_err(|e| e.to_string())?;
    dashboard::load_summary(&store, &user_id).map_err(|e| e.to_string())
}

/// The four most recent feed rows, newest first.
#[tauri::command]
pub fn activity_feed(state: State<'_, Arc<CoreState>>) -> Result<Vec<FeedItem>, String> {
    let user_id = state.require_user_id().map_err(|e| e.to_string())?;
    let store = state.store_client().map_err(|e| e.to_string())?;
    dashboard::load_activity_feed(&store, &user_id).map_err(|e| e.to_string())
}

/// Name for the dashboard greeting.
#[tauri::command]
pub fn greeting_name(state: State<'_, Arc<CoreState>>) -> Result<String, String> {
    let user_id = state.require_user_id().map_err(|e| e.to_string())?;
    let store = state.store_client().map_err(|e| e.to_string())?;
    let session = state.session();
    Ok(dashboard::resolve_display_name(
        session.user_data.as_ref(),
        None,
        &store,
        &user_id,
    ))
}
