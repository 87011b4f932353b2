//! Account flows: login, registration, logout, and the small display
//! helpers the account page uses.
//!
//! Registration enforces the password policy locally (at least 8
//! characters with lower case, upper case, a digit, and a symbol)
//! before the provider is contacted, creates the profile document and
//! an empty medical-information document, and hands the user to the
//! medical-info page. Login caches the profile in the session store so
//! the dashboard greeting does not need a round trip.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{info, warn};

use crate::auth::{AuthError, IdentityProvider};
use crate::firestore::DocumentStore;
use crate::models::{MedicalInformation, UserProfile};
use crate::session_store::{SessionStore, StoredSession};

/// Message for a failed password policy check.
pub const PASSWORD_POLICY_MESSAGE: &str = "Password must be at least 8 characters and include \
     an uppercase letter, a lowercase letter, a number, and a special character.";

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

/// Account-flow errors; Display strings are shown to the user as-is.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),
    /// Provider failure, already mapped to its page message.
    #[error("{0}")]
    Provider(String),
    #[error("{0}")]
    Store(#[from] crate::firestore::StoreError),
    #[error("{0}")]
    Session(#[from] crate::session_store::SessionStoreError),
}

// ═══════════════════════════════════════════════════════════
// Validation helpers
// ═══════════════════════════════════════════════════════════

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

/// Password policy: minimum 8 characters, with lower case, upper case,
/// a digit, and a non-alphanumeric character.
pub fn password_meets_policy(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_ascii_alphanumeric())
}

/// `(xxx) xxx-xxxx` for ten-digit numbers; anything else is shown as
/// entered.
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 {
        format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
    } else {
        raw.to_string()
    }
}

// ═══════════════════════════════════════════════════════════
// Login
// ═══════════════════════════════════════════════════════════

/// Sign in, cache the profile, persist the session. Returns the profile
/// for the redirect target (the dashboard).
pub fn login(
    provider: &dyn IdentityProvider,
    store: &dyn DocumentStore,
    sessions: &SessionStore,
    email: &str,
    password: &str,
    remember_me: bool,
) -> Result<UserProfile, AccountError> {
    let auth = sign_in(provider, email, password)?;
    complete_login(store, sessions, auth, remember_me)
}

/// Provider half of the login; the document store is only reachable
/// once the returned token exists.
pub fn sign_in(
    provider: &dyn IdentityProvider,
    email: &str,
    password: &str,
) -> Result<crate::auth::AuthSession, AccountError> {
    provider.sign_in(email.trim(), password).map_err(login_error)
}

/// Store half of the login, run with a token-bearing document store.
pub fn complete_login(
    store: &dyn DocumentStore,
    sessions: &SessionStore,
    auth: crate::auth::AuthSession,
    remember_me: bool,
) -> Result<UserProfile, AccountError> {
    // The users document is authoritative; fall back to what the
    // provider returned when it is missing.
    let profile = match store.user_profile(&auth.uid) {
        Ok(Some(mut profile)) => {
            profile.uid = auth.uid.clone();
            profile
        }
        Ok(None) => UserProfile {
            uid: auth.uid.clone(),
            name: auth.display_name.clone().unwrap_or_default(),
            email: auth.email.clone(),
            ..Default::default()
        },
        Err(e) => {
            warn!("Could not load profile at login: {e}");
            UserProfile {
                uid: auth.uid.clone(),
                email: auth.email.clone(),
                ..Default::default()
            }
        }
    };

    sessions.save(&StoredSession {
        token: Some(auth.id_token),
        user_data: Some(profile.clone()),
        remember_me,
        latest_report_id: None,
    })?;
    info!(uid = %auth.uid, "Login complete");
    Ok(profile)
}

fn login_error(e: AuthError) -> AccountError {
    match &e {
        AuthError::Provider { code, .. } => AccountError::Provider(code.login_message()),
        AuthError::Connection => {
            AccountError::Provider("Failed to login. Could not reach the server.".to_string())
        }
        _ => AccountError::Provider(e.code().login_message()),
    }
}

// ═══════════════════════════════════════════════════════════
// Registration
// ═══════════════════════════════════════════════════════════

/// Raw registration form input.
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    fn validate(&self) -> Result<(), AccountError> {
        if self.name.trim().is_empty() {
            return Err(AccountError::Validation("Please enter your name.".into()));
        }
        if !is_valid_email(&self.email) {
            return Err(AccountError::Validation(
                "Please enter a valid email address.".into(),
            ));
        }
        if self.password != self.confirm_password {
            return Err(AccountError::Validation("Passwords do not match.".into()));
        }
        if !password_meets_policy(&self.password) {
            return Err(AccountError::Validation(PASSWORD_POLICY_MESSAGE.into()));
        }
        Ok(())
    }
}

/// Create the account, its profile document, and an empty
/// medical-information document, then persist the session. The caller
/// redirects to the medical-info page.
pub fn register(
    provider: &dyn IdentityProvider,
    store: &dyn DocumentStore,
    sessions: &SessionStore,
    form: &RegisterForm,
) -> Result<UserProfile, AccountError> {
    let auth = sign_up(provider, form)?;
    complete_registration(store, sessions, auth, form)
}

/// Provider half of registration: validate the form, create the
/// account, set the display name.
pub fn sign_up(
    provider: &dyn IdentityProvider,
    form: &RegisterForm,
) -> Result<crate::auth::AuthSession, AccountError> {
    form.validate()?;

    let auth = provider
        .sign_up(form.email.trim(), &form.password)
        .map_err(register_error)?;

    if let Err(e) = provider.set_display_name(&auth.id_token, form.name.trim()) {
        warn!("Could not set provider display name: {e}");
    }
    Ok(auth)
}

/// Store half of registration, run with a token-bearing document store.
pub fn complete_registration(
    store: &dyn DocumentStore,
    sessions: &SessionStore,
    auth: crate::auth::AuthSession,
    form: &RegisterForm,
) -> Result<UserProfile, AccountError> {
    let name = form.name.trim().to_string();
    let profile = UserProfile {
        uid: auth.uid.clone(),
        name,
        email: auth.email.clone(),
        phone: form.phone.trim().to_string(),
        role: "patient".to_string(),
        ..Default::default()
    };
    store.save_user_profile(&profile)?;
    store.save_medical_information(&auth.uid, &MedicalInformation::default())?;

    sessions.save(&StoredSession {
        token: Some(auth.id_token),
        user_data: Some(profile.clone()),
        remember_me: false,
        latest_report_id: None,
    })?;
    info!(uid = %auth.uid, "Registration complete");
    Ok(profile)
}

fn register_error(e: AuthError) -> AccountError {
    match &e {
        AuthError::Provider { code, .. } => AccountError::Provider(code.register_message()),
        AuthError::Connection => AccountError::Provider(
            "Failed to create account. Could not reach the server.".to_string(),
        ),
        _ => AccountError::Provider(e.code().register_message()),
    }
}

// ═══════════════════════════════════════════════════════════
// Logout
// ═══════════════════════════════════════════════════════════

/// Clear the persisted session. The caller redirects to the login view.
pub fn logout(sessions: &SessionStore) -> Result<(), AccountError> {
    sessions.clear()?;
    info!("Signed out");
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
