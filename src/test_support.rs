//! Shared in-memory fakes for the external collaborators.
//!
//! Compiled for tests only. Each fake records the calls it receives and
//! serves canned responses configured through its public fields.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::auth::{AuthError, AuthErrorCode, AuthSession, IdentityProvider};
use crate::backend::{BackendApi, BackendError, FirebaseConfig, GeneratedReport, TranscribeMeta};
use crate::firestore::{DocumentStore, StoreError};
use crate::models::{
    ActivityEntry, Appointment, BookingRequest, MedicalInformation, Prediction, RawHealthReport,
    SymptomRecord, UserProfile,
};

// ═══════════════════════════════════════════════════════════
// Backend fake
// ═══════════════════════════════════════════════════════════

#[derive(Default)]
pub struct FakeBackend {
    /// `None` makes transcription fail with a 500.
    pub transcript: Mutex<Option<String>>,
    /// Makes transcription fail before any response arrives.
    pub transcribe_connection_error: Mutex<bool>,
    pub symptoms: Mutex<Vec<String>>,
    pub saved_symptom_id: Mutex<String>,
    pub prediction: Mutex<Prediction>,
    pub records: Mutex<Vec<SymptomRecord>>,
    /// Detailed reports by id; missing ids yield `NotFound`.
    pub detailed: Mutex<HashMap<String, RawHealthReport>>,
    pub generated: Mutex<Option<GeneratedReport>>,
    pub appointment_list: Mutex<Vec<Appointment>>,
    pub booked: Mutex<Vec<BookingRequest>>,
    /// Method-name call log, in order.
    pub calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let fake = Self::default();
        *fake.saved_symptom_id.lock().unwrap() = "sym-1".to_string();
        fake
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl BackendApi for FakeBackend {
    fn firebase_config(&self) -> Result<FirebaseConfig, BackendError> {
        self.record("firebase_config");
        Ok(FirebaseConfig {
            api_key: "test-key".into(),
            project_id: "test-project".into(),
            ..Default::default()
        })
    }

    fn transcribe(
        &self,
        _user_id: &str,
        _audio_chunks: &[String],
        _meta: &TranscribeMeta,
    ) -> Result<String, BackendError> {
        self.record("transcribe");
        if *self.transcribe_connection_error.lock().unwrap() {
            return Err(BackendError::Connection("http://localhost:8000".into()));
        }
        match self.transcript.lock().unwrap().clone() {
            Some(text) => Ok(text),
            None => Err(BackendError::Status {
                status: 500,
                body: "transcription error".into(),
            }),
        }
    }

    fn analyze_symptoms(&self, _transcript: &str) -> Result<Vec<String>, BackendError> {
        self.record("analyze_symptoms");
        Ok(self.symptoms.lock().unwrap().clone())
    }

    fn save_symptoms(
        &self,
        _user_id: &str,
        _transcript: &str,
        _symptoms: &[String],
        _audio_url: &str,
    ) -> Result<String, BackendError> {
        self.record("save_symptoms");
        Ok(self.saved_symptom_id.lock().unwrap().clone())
    }

    fn predict_ailment(
        &self,
        _user_id: &str,
        _symptoms: &[String],
        _symptom_id: Option<&str>,
    ) -> Result<Prediction, BackendError> {
        self.record("predict_ailment");
        Ok(self.prediction.lock().unwrap().clone())
    }

    fn health_reports(&self, _user_id: &str) -> Result<Vec<SymptomRecord>, BackendError> {
        self.record("health_reports");
        Ok(self.records.lock().unwrap().clone())
    }

    fn detailed_report(&self, report_id: &str) -> Result<RawHealthReport, BackendError> {
        self.record(&format!("detailed_report:{report_id}"));
        self.detailed
            .lock()
            .unwrap()
            .get(report_id)
            .cloned()
            .ok_or(BackendError::NotFound)
    }

    fn generate_report(
        &self,
        _user_id: &str,
        symptom_id: &str,
    ) -> Result<GeneratedReport, BackendError> {
        self.record(&format!("generate_report:{symptom_id}"));
        match self.generated.lock().unwrap().clone() {
            Some(generated) => Ok(generated),
            None => Ok(GeneratedReport {
                report_id: symptom_id.to_string(),
                existing: false,
            }),
        }
    }

    fn book_appointment(&self, booking: &BookingRequest) -> Result<String, BackendError> {
        self.record("book_appointment");
        self.booked.lock().unwrap().push(booking.clone());
        Ok(format!("APT_{}_1724400000", booking.user_id))
    }

    fn appointments(&self, _user_id: &str) -> Result<Vec<Appointment>, BackendError> {
        self.record("appointments");
        Ok(self.appointment_list.lock().unwrap().clone())
    }
}

// ═══════════════════════════════════════════════════════════
// Document-store fake
// ═══════════════════════════════════════════════════════════

#[derive(Default)]
pub struct FakeStore {
    pub profiles: Mutex<HashMap<String, UserProfile>>,
    pub medical: Mutex<HashMap<String, MedicalInformation>>,
    pub reports: Mutex<Vec<RawHealthReport>>,
    pub activities: Mutex<Vec<ActivityEntry>>,
    /// Force every call to fail, for best-effort paths.
    pub fail: Mutex<bool>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(&self) -> Result<(), StoreError> {
        if *self.fail.lock().unwrap() {
            Err(StoreError::Connection)
        } else {
            Ok(())
        }
    }
}

impl DocumentStore for FakeStore {
    fn user_profile(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        self.check()?;
        Ok(self.profiles.lock().unwrap().get(uid).cloned())
    }

    fn save_user_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        self.check()?;
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.uid.clone(), profile.clone());
        Ok(())
    }

    fn medical_information(&self, uid: &str) -> Result<Option<MedicalInformation>, StoreError> {
        self.check()?;
        Ok(self.medical.lock().unwrap().get(uid).cloned())
    }

    fn save_medical_information(
        &self,
        uid: &str,
        info: &MedicalInformation,
    ) -> Result<(), StoreError> {
        self.check()?;
        self.medical
            .lock()
            .unwrap()
            .insert(uid.to_string(), info.clone());
        Ok(())
    }

    fn health_reports(&self, user_id: &str) -> Result<Vec<RawHealthReport>, StoreError> {
        self.check()?;
        Ok(self
            .reports
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect())
    }

    fn latest_report(&self, user_id: &str) -> Result<Option<RawHealthReport>, StoreError> {
        self.check()?;
        let mut matching: Vec<RawHealthReport> = self
            .reports
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.report_generated_at.cmp(&a.report_generated_at));
        Ok(matching.into_iter().next())
    }

    fn recent_activity(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, StoreError> {
        self.check()?;
        let entries = self.activities.lock().unwrap();
        Ok(entries
            .iter()
            .filter(|a| a.user_id == user_id)
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }

    fn append_activity(&self, entry: &ActivityEntry) -> Result<(), StoreError> {
        self.check()?;
        self.activities.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Identity-provider fake
// ═══════════════════════════════════════════════════════════

#[derive(Default)]
pub struct FakeIdentity {
    /// Registered accounts: email → password.
    pub accounts: Mutex<HashMap<String, String>>,
    pub display_names: Mutex<HashMap<String, String>>,
}

impl FakeIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(email: &str, password: &str) -> Self {
        let fake = Self::default();
        fake.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), password.to_string());
        fake
    }

    fn session_for(email: &str) -> AuthSession {
        AuthSession {
            uid: format!("uid-{email}"),
            id_token: format!("token-{email}"),
            email: email.to_string(),
            display_name: None,
        }
    }
}

impl IdentityProvider for FakeIdentity {
    fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(email) {
            Some(stored) if stored == password => Ok(Self::session_for(email)),
            Some(_) => Err(AuthError::Provider {
                code: AuthErrorCode::WrongPassword,
                raw: "INVALID_PASSWORD".into(),
            }),
            None => Err(AuthError::Provider {
                code: AuthErrorCode::UserNotFound,
                raw: "EMAIL_NOT_FOUND".into(),
            }),
        }
    }

    fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(AuthError::Provider {
                code: AuthErrorCode::EmailExists,
                raw: "EMAIL_EXISTS".into(),
            });
        }
        accounts.insert(email.to_string(), password.to_string());
        Ok(Self::session_for(email))
    }

    fn set_display_name(&self, id_token: &str, display_name: &str) -> Result<(), AuthError> {
        self.display_names
            .lock()
            .unwrap()
            .insert(id_token.to_string(), display_name.to_string());
        Ok(())
    }
}
