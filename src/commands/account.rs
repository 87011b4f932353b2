//! Login, registration, logout, and the session gate check.

use std::sync::Arc;

use tauri::State;

use crate::account::{self, RegisterForm};
use crate::core_state::CoreState;
use crate::models::UserProfile;
use crate::session_gate::{GateDecision, PageKind};

/// Sign in and cache the profile. The frontend redirects to the
/// dashboard on success.
#[tauri::command]
pub fn login(
    email: String,
    password: String,
    remember_me: bool,
    state: State<'_, Arc<CoreState>>,
) -> Result<UserProfile, String> {
    let provider = state.auth_client().map_err(|e| e.to_string())?;
    let auth = account::sign_in(&provider, &email, &password).map_err(|e| e.to_string())?;

    let store = state
        .store_client_for(&auth.id_token)
        .map_err(|e| e.to_string())?;
    let profile = account::complete_login(&store, state.sessions(), auth, remember_me)
        .map_err(|e| e.to_string())?;

    state.refresh_session();
    state.gate().observe(true);
    Ok(profile)
}

/// Create an account, its profile and medical-information documents.
/// The frontend redirects to the medical-info page on success.
#[tauri::command]
pub fn register(
    name: String,
    email: String,
    phone: String,
    password: String,
    confirm_password: String,
    state: State<'_, Arc<CoreState>>,
) -> Result<UserProfile, String> {
    let form = RegisterForm {
        name,
        email,
        phone,
        password,
        confirm_password,
    };
    let provider = state.auth_client().map_err(|e| e.to_string())?;
    let auth = account::sign_up(&provider, &form).map_err(|e| e.to_string())?;

    let store = state
        .store_client_for(&auth.id_token)
        .map_err(|e| e.to_string())?;
    let profile = account::complete_registration(&store, state.sessions(), auth, &form)
        .map_err(|e| e.to_string())?;

    state.refresh_session();
    state.gate().observe(true);
    Ok(profile)
}

/// Clear the session. The frontend redirects to the login view.
#[tauri::command]
pub fn logout(state: State<'_, Arc<CoreState>>) -> Result<(), String> {
    account::logout(state.sessions()).map_err(|e| e.to_string())?;
    state.refresh_session();
    state.gate().observe(false);
    Ok(())
}

/// Gate check, called once per page load. Returns `allow`, `login`, or
/// `dashboard` (the redirect targets).
#[tauri::command]
pub fn check_session(page: String, state: State<'_, Arc<CoreState>>) -> Result<String, String> {
    let kind = match page.as_str() {
        "login" | "register" => PageKind::Entry,
        _ => PageKind::Protected,
    };

    let authenticated = state.session().is_authenticated();
    let mut gate = state.gate();
    gate.begin_page_load();
    gate.observe(authenticated);
    let decision = match gate.decide(kind) {
        GateDecision::Allow => "allow",
        GateDecision::RedirectToLogin => "login",
        GateDecision::RedirectToDashboard => "dashboard",
    };
    Ok(decision.to_string())
}

/// Phone number as displayed on the account page.
#[tauri::command]
pub fn format_phone_number(raw: String) -> String {
    account::format_phone(&raw)
}
