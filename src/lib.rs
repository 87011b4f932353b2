pub mod account;
pub mod activity;
pub mod appointments;
pub mod auth;
pub mod backend;
pub mod commands;
pub mod config;
pub mod core_state;
pub mod dashboard;
pub mod firestore;
pub mod intake;
pub mod medical_info;
pub mod models;
pub mod recorder;
pub mod report;
pub mod retry;
pub mod session_gate;
pub mod session_store;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("MediAssist starting v{}", config::APP_VERSION);

    tauri::Builder::default()
        .manage(Arc::new(core_state::CoreState::new()))
        .invoke_handler(tauri::generate_handler![
            commands::health_check,
            commands::account::login,
            commands::account::register,
            commands::account::logout,
            commands::account::check_session,
            commands::account::format_phone_number,
            commands::intake::start_recording,
            commands::intake::push_audio_chunk,
            commands::intake::stop_recording,
            commands::intake::discard_recording,
            commands::intake::report_capture_failure,
            commands::intake::confirm_recording,
            commands::intake::analyze_transcript,
            commands::intake::predict_ailment,
            commands::intake::generate_health_report,
            commands::intake::clear_intake,
            commands::report::load_report,
            commands::appointments::available_slots,
            commands::appointments::book_appointment,
            commands::appointments::load_appointments,
            commands::appointments::cancel_appointment,
            commands::appointments::reschedule_appointment,
            commands::dashboard::symptom_trends,
            commands::dashboard::dashboard_summary,
            commands::dashboard::activity_feed,
            commands::dashboard::greeting_name,
            commands::medical_info::load_medical_info,
            commands::medical_info::save_medical_info,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
