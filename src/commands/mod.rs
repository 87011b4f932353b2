//! Tauri IPC commands, one module per page.
//!
//! Commands are thin: validate input, borrow what they need from
//! `CoreState`, delegate to the page module, and flatten errors to the
//! strings the frontend displays.

pub mod account;
pub mod appointments;
pub mod dashboard;
pub mod intake;
pub mod medical_info;
pub mod report;

/// Health check IPC command — verifies the app backend is running.
#[tauri::command]
pub fn health_check() -> String {
    tracing::debug!("Health check called");
    "ok".to_string()
}
