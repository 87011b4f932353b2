//! Identity provider access (Firebase Auth over the Identity Toolkit
//! REST API).
//!
//! The provider itself is an external collaborator; this module only
//! wraps its public sign-in/sign-up contract and maps its error codes to
//! the small fixed set of user-facing messages the login and registration
//! pages show. The API key comes from the `/firebase-config` bootstrap.

use serde::{Deserialize, Serialize};

const IDENTITY_TOOLKIT_BASE: &str = "https://identitytoolkit.googleapis.com/v1";

/// An authenticated provider session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Provider-issued user id.
    pub uid: String,
    /// Bearer token for backend calls; persisted as the `token` key.
    pub id_token: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Provider error codes this client distinguishes. Everything else is
/// collapsed to `Other`, which maps to the generic "Please try again."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    InvalidEmail,
    UserDisabled,
    UserNotFound,
    WrongPassword,
    EmailExists,
    OperationNotAllowed,
    WeakPassword,
    Other,
}

impl AuthErrorCode {
    fn from_provider(code: &str) -> Self {
        // INVALID_LOGIN_CREDENTIALS is the newer combined code for
        // wrong-password / unknown-email responses.
        match code {
            "INVALID_EMAIL" => Self::InvalidEmail,
            "USER_DISABLED" => Self::UserDisabled,
            "EMAIL_NOT_FOUND" => Self::UserNotFound,
            "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => Self::WrongPassword,
            "EMAIL_EXISTS" => Self::EmailExists,
            "OPERATION_NOT_ALLOWED" => Self::OperationNotAllowed,
            c if c.starts_with("WEAK_PASSWORD") => Self::WeakPassword,
            _ => Self::Other,
        }
    }

    /// User-facing message on the login page.
    pub fn login_message(self) -> String {
        let detail = match self {
            Self::InvalidEmail => "Please enter a valid email address.",
            Self::UserDisabled => "This account has been disabled.",
            Self::UserNotFound => "No account found with this email.",
            Self::WrongPassword => "Incorrect password.",
            _ => "Please try again.",
        };
        format!("Failed to login. {detail}")
    }

    /// User-facing message on the registration page.
    pub fn register_message(self) -> String {
        let detail = match self {
            Self::EmailExists => "This email is already registered.",
            Self::InvalidEmail => "Please enter a valid email address.",
            Self::OperationNotAllowed => "Email/password accounts are not enabled.",
            Self::WeakPassword => "Please choose a stronger password.",
            _ => "Please try again.",
        };
        format!("Failed to create account. {detail}")
    }
}

/// Errors from identity-provider calls.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Could not reach the identity provider")]
    Connection,
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error("Provider rejected the request: {raw}")]
    Provider { code: AuthErrorCode, raw: String },
    #[error("Failed to parse provider response: {0}")]
    ResponseParsing(String),
}

impl AuthError {
    /// The distinguished provider code, when there is one.
    pub fn code(&self) -> AuthErrorCode {
        match self {
            Self::Provider { code, .. } => *code,
            _ => AuthErrorCode::Other,
        }
    }
}

/// The identity-provider surface the account flows depend on.
pub trait IdentityProvider {
    fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;
    fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;
    /// Sets the provider-side display name on a fresh registration.
    fn set_display_name(&self, id_token: &str, display_name: &str) -> Result<(), AuthError>;
}

// ── Wire payloads ───────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    local_id: String,
    id_token: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorEnvelope {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    message: String,
}

// ── Client ──────────────────────────────────────────────────

/// Identity Toolkit REST client.
pub struct FirebaseAuthClient {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl FirebaseAuthClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(IDENTITY_TOOLKIT_BASE, api_key)
    }

    pub fn with_base_url(base_url: &str, api_key: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        }
    }

    fn post<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        action: &str,
        body: &B,
    ) -> Result<T, AuthError> {
        let url = format!("{}/accounts:{}?key={}", self.base_url, action, self.api_key);
        let response = self.client.post(&url).json(body).send().map_err(|e| {
            if e.is_connect() {
                AuthError::Connection
            } else {
                AuthError::HttpClient(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let raw = response.text().unwrap_or_default();
            let message = serde_json::from_str::<ProviderErrorEnvelope>(&raw)
                .map(|e| e.error.message)
                .unwrap_or_default();
            return Err(AuthError::Provider {
                code: AuthErrorCode::from_provider(&message),
                raw: if message.is_empty() { raw } else { message },
            });
        }

        response
            .json()
            .map_err(|e| AuthError::ResponseParsing(e.to_string()))
    }

    fn to_session(parsed: SessionResponse) -> AuthSession {
        AuthSession {
            uid: parsed.local_id,
            id_token: parsed.id_token,
            email: parsed.email,
            display_name: parsed.display_name.filter(|n| !n.is_empty()),
        }
    }
}

impl IdentityProvider for FirebaseAuthClient {
    fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let parsed: SessionResponse = self.post("signInWithPassword", &body)?;
        Ok(Self::to_session(parsed))
    }

    fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let parsed: SessionResponse = self.post("signUp", &body)?;
        Ok(Self::to_session(parsed))
    }

    fn set_display_name(&self, id_token: &str, display_name: &str) -> Result<(), AuthError> {
        let body = UpdateProfileRequest {
            id_token,
            display_name,
            return_secure_token: false,
        };
        let _: serde_json::Value = self.post("update", &body)?;
        Ok(())
    }
}
