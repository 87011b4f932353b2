//! Appointments page: booking form, list, and the pending actions.

use std::sync::Arc;

use tauri::State;

use crate::appointments::{self, BookingConfirmation, BookingForm, TIME_SLOTS};
use crate::core_state::CoreState;
use crate::models::UrgencyTier;

/// The bookable time slots, in form order.
#[tauri::command]
pub fn available_slots() -> Vec<String> {
    TIME_SLOTS.iter().map(|s| s.to_string()).collect()
}

/// Validate and submit a booking. `symptom_id` defaults to the intake
/// session's saved record when the form doesn't carry one.
#[tauri::command]
pub fn book_appointment(
    preferred_date: String,
    preferred_time: String,
    urgency: Option<UrgencyTier>,
    notes: String,
    symptom_id: Option<String>,
    state: State<'_, Arc<CoreState>>,
) -> Result<BookingConfirmation, String> {
    let user_id = state.require_user_id().map_err(|e| e.to_string())?;
    let symptom_id = symptom_id.or_else(|| state.intake().symptom_id.clone());

    let form = BookingForm {
        preferred_date,
        preferred_time,
        urgency,
        notes,
    };
    appointments::book(
        state.backend(),
        &form,
        &user_id,
        symptom_id.as_deref(),
        chrono::Local::now().date_naive(),
    )
    .map_err(|e| e.to_string())
}

/// Fetch and render the user's appointment cards.
#[tauri::command]
pub fn load_appointments(state: State<'_, Arc<CoreState>>) -> Result<String, String> {
    let user_id = state.require_user_id().map_err(|e| e.to_string())?;
    appointments::load_appointments(state.backend(), &user_id).map_err(|e| e.to_string())
}

/// Not built yet; returns the fixed pending message.
#[tauri::command]
pub fn cancel_appointment(appointment_id: String) -> String {
    appointments::cancel_appointment(&appointment_id)
}

/// Not built yet; returns the fixed pending message.
#[tauri::command]
pub fn reschedule_appointment(appointment_id: String) -> String {
    appointments::reschedule_appointment(&appointment_id)
}
