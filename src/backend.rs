//! HTTP relay client for the companion MediAssist API.
//!
//! Every "hard" computation (speech-to-text, symptom NLP, ailment
//! inference, report generation) lives behind these endpoints; this
//! client only forwards requests and decodes responses. The `BackendApi`
//! trait is the seam the page flows are written against, so tests can
//! substitute a scripted backend.

use serde::{Deserialize, Serialize};

use crate::config;
use crate::models::{
    Appointment, BookingRequest, Prediction, RawHealthReport, SymptomRecord,
};

/// Errors from companion-API calls.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Could not reach the MediAssist API at {0}")]
    Connection(String),
    #[error("Request timed out")]
    Timeout,
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Resource not found")]
    NotFound,
    #[error("Failed to parse API response: {0}")]
    ResponseParsing(String),
}

impl BackendError {
    /// Whether this is the detailed-report 404 the resolution ladder
    /// treats as "generate one now" rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

// ── Wire payloads ───────────────────────────────────────────

/// Bootstrap credentials served by `GET /firebase-config`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub auth_domain: String,
    #[serde(default)]
    pub storage_bucket: String,
    #[serde(default)]
    pub messaging_sender_id: String,
    #[serde(default)]
    pub app_id: String,
}

/// Upload metadata attached to a transcription request.
#[derive(Debug, Clone, Serialize)]
pub struct TranscribeMeta {
    pub filename: String,
    /// Milliseconds since the epoch, matching the original client.
    pub timestamp: i64,
}

/// `POST /api/transcribe` body. `audio_chunks` is snake_case on the wire
/// (historical; the backend reads exactly that key) and currently always
/// holds a single base64 data-URL chunk.
#[derive(Debug, Clone, Serialize)]
struct TranscribeRequest<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
    audio_chunks: &'a [String],
    meta: &'a TranscribeMeta,
}

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    text: String,
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    transcript: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    symptoms: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveSymptomsRequest<'a> {
    user_id: &'a str,
    transcript: &'a str,
    symptoms: &'a [String],
    audio_url: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveSymptomsResponse {
    symptom_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictRequest<'a> {
    user_id: &'a str,
    symptoms: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    symptom_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HealthReportsResponse {
    #[serde(default)]
    health_reports: Vec<SymptomRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailedReportResponse {
    health_report: RawHealthReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateReportRequest<'a> {
    user_id: &'a str,
    symptom_id: &'a str,
}

/// `POST /api/generate-health-report` result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedReport {
    pub report_id: String,
    /// True when a report for this symptom record already existed.
    #[serde(default)]
    pub existing: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingResponse {
    appointment_id: String,
}

#[derive(Debug, Deserialize)]
struct AppointmentsResponse {
    #[serde(default)]
    appointments: Vec<Appointment>,
}

// ── Trait seam ──────────────────────────────────────────────

/// The companion-API surface the page flows depend on.
pub trait BackendApi {
    fn firebase_config(&self) -> Result<FirebaseConfig, BackendError>;
    fn transcribe(
        &self,
        user_id: &str,
        audio_chunks: &[String],
        meta: &TranscribeMeta,
    ) -> Result<String, BackendError>;
    fn analyze_symptoms(&self, transcript: &str) -> Result<Vec<String>, BackendError>;
    fn save_symptoms(
        &self,
        user_id: &str,
        transcript: &str,
        symptoms: &[String],
        audio_url: &str,
    ) -> Result<String, BackendError>;
    fn predict_ailment(
        &self,
        user_id: &str,
        symptoms: &[String],
        symptom_id: Option<&str>,
    ) -> Result<Prediction, BackendError>;
    fn health_reports(&self, user_id: &str) -> Result<Vec<SymptomRecord>, BackendError>;
    fn detailed_report(&self, report_id: &str) -> Result<RawHealthReport, BackendError>;
    fn generate_report(
        &self,
        user_id: &str,
        symptom_id: &str,
    ) -> Result<GeneratedReport, BackendError>;
    fn book_appointment(&self, booking: &BookingRequest) -> Result<String, BackendError>;
    fn appointments(&self, user_id: &str) -> Result<Vec<Appointment>, BackendError>;
}

// ── Client ──────────────────────────────────────────────────

/// Blocking HTTP client for the companion API.
pub struct BackendClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl BackendClient {
    /// Create a client against the given base URL.
    ///
    /// A connect timeout is set, but no overall request timeout: the
    /// transcription and prediction endpoints block on remote model
    /// inference and have no bounded latency.
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Client against the configured API base URL.
    pub fn from_config() -> Self {
        Self::new(&config::api_base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn classify(&self, e: reqwest::Error) -> BackendError {
        if e.is_connect() {
            BackendError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            BackendError::Timeout
        } else {
            BackendError::HttpClient(e.to_string())
        }
    }

    fn check_status(
        &self,
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, BackendError> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().map_err(|e| self.classify(e))?;
        self.check_status(response)?
            .json()
            .map_err(|e| BackendError::ResponseParsing(e.to_string()))
    }

    fn post_json<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| self.classify(e))?;
        self.check_status(response)?
            .json()
            .map_err(|e| BackendError::ResponseParsing(e.to_string()))
    }
}

impl BackendApi for BackendClient {
    fn firebase_config(&self) -> Result<FirebaseConfig, BackendError> {
        self.get_json("/firebase-config")
    }

    fn transcribe(
        &self,
        user_id: &str,
        audio_chunks: &[String],
        meta: &TranscribeMeta,
    ) -> Result<String, BackendError> {
        let body = TranscribeRequest {
            user_id,
            audio_chunks,
            meta,
        };
        let parsed: TranscribeResponse = self.post_json("/api/transcribe", &body)?;
        Ok(parsed.text)
    }

    fn analyze_symptoms(&self, transcript: &str) -> Result<Vec<String>, BackendError> {
        let parsed: AnalyzeResponse =
            self.post_json("/api/analyze-symptoms", &AnalyzeRequest { transcript })?;
        Ok(parsed.symptoms)
    }

    fn save_symptoms(
        &self,
        user_id: &str,
        transcript: &str,
        symptoms: &[String],
        audio_url: &str,
    ) -> Result<String, BackendError> {
        let body = SaveSymptomsRequest {
            user_id,
            transcript,
            symptoms,
            audio_url,
        };
        let parsed: SaveSymptomsResponse = self.post_json("/api/save-symptoms", &body)?;
        Ok(parsed.symptom_id)
    }

    fn predict_ailment(
        &self,
        user_id: &str,
        symptoms: &[String],
        symptom_id: Option<&str>,
    ) -> Result<Prediction, BackendError> {
        let body = PredictRequest {
            user_id,
            symptoms,
            symptom_id,
        };
        self.post_json("/api/predict-ailment", &body)
    }

    fn health_reports(&self, user_id: &str) -> Result<Vec<SymptomRecord>, BackendError> {
        let parsed: HealthReportsResponse =
            self.get_json(&format!("/api/health-reports/{user_id}"))?;
        Ok(parsed.health_reports)
    }

    fn detailed_report(&self, report_id: &str) -> Result<RawHealthReport, BackendError> {
        let parsed: DetailedReportResponse =
            self.get_json(&format!("/api/health-reports/detailed/{report_id}"))?;
        Ok(parsed.health_report)
    }

    fn generate_report(
        &self,
        user_id: &str,
        symptom_id: &str,
    ) -> Result<GeneratedReport, BackendError> {
        let body = GenerateReportRequest {
            user_id,
            symptom_id,
        };
        self.post_json("/api/generate-health-report", &body)
    }

    fn book_appointment(&self, booking: &BookingRequest) -> Result<String, BackendError> {
        let parsed: BookingResponse = self.post_json("/api/book-appointment", booking)?;
        Ok(parsed.appointment_id)
    }

    fn appointments(&self, user_id: &str) -> Result<Vec<Appointment>, BackendError> {
        let parsed: AppointmentsResponse = self.get_json(&format!("/api/appointments/{user_id}"))?;
        Ok(parsed.appointments)
    }
}
