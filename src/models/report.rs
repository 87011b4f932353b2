//! Health report payloads and their canonical view.
//!
//! Two field-naming conventions exist in stored reports: newer documents
//! carry `aiAnalysis` + `symptomAnalysis.{transcript,symptoms}`, older ones
//! `prediction` + top-level `transcript`/`symptoms`. Rather than branching
//! at every render site, `RawHealthReport::normalize()` folds both shapes
//! into one `HealthReportView` at the data-access boundary.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use super::medical_info::MedicalSnapshot;
use super::prediction::{PossibleAilment, Prediction};
use super::user::PatientInfo;

/// A health report exactly as it arrives from
/// `GET /api/health-reports/detailed/{id}` — every field optional,
/// both naming conventions tolerated.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawHealthReport {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub report_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub symptom_id: Option<String>,
    #[serde(default)]
    pub patient_info: Option<PatientInfo>,
    #[serde(default)]
    pub medical_info: Option<MedicalSnapshot>,
    /// Newer shape: nested symptom analysis.
    #[serde(default)]
    pub symptom_analysis: Option<SymptomAnalysis>,
    /// Older shape: top-level transcript.
    #[serde(default)]
    pub transcript: Option<String>,
    /// Older shape: top-level symptoms.
    #[serde(default)]
    pub symptoms: Option<Vec<String>>,
    /// Newer shape: the prediction bundle.
    #[serde(default)]
    pub ai_analysis: Option<Prediction>,
    /// Older shape: the prediction bundle.
    #[serde(default)]
    pub prediction: Option<Prediction>,
    #[serde(default)]
    pub highest_confidence_ailment: Option<PossibleAilment>,
    #[serde(default)]
    pub health_score: Option<f64>,
    #[serde(default)]
    pub report_generated_at: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
}

/// Nested symptom-analysis block on newer reports.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomAnalysis {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub recorded_at: Option<String>,
}

/// Canonical report shape consumed by every render site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReportView {
    /// Human-readable report id (`HR_<uid>_<ts>`), if assigned.
    pub report_id: Option<String>,
    /// Backing document id.
    pub record_id: Option<String>,
    /// Id of the symptom record the report was generated from.
    pub symptom_id: Option<String>,
    pub patient_info: Option<PatientInfo>,
    pub medical_info: Option<MedicalSnapshot>,
    pub transcript: String,
    pub symptoms: Vec<String>,
    /// The prediction bundle; `None` when neither shape carried one.
    pub analysis: Option<Prediction>,
    pub highest_confidence_ailment: Option<PossibleAilment>,
    pub health_score: Option<f64>,
    /// ISO 8601; `reportGeneratedAt` preferred over `created`.
    pub generated_at: Option<String>,
}

impl RawHealthReport {
    /// Normalize both historical shapes into the canonical view.
    ///
    /// Precedence follows the original render logic: nested symptom
    /// analysis wins over top-level fields, `aiAnalysis` wins over
    /// `prediction`, `reportGeneratedAt` wins over `created`.
    pub fn normalize(self) -> HealthReportView {
        let (transcript, symptoms) = match self.symptom_analysis {
            Some(sa) if !sa.transcript.is_empty() || !sa.symptoms.is_empty() => {
                (sa.transcript, sa.symptoms)
            }
            _ => (
                self.transcript.unwrap_or_default(),
                self.symptoms.unwrap_or_default(),
            ),
        };

        let analysis = self
            .ai_analysis
            .filter(|p| !p.is_empty())
            .or(self.prediction.filter(|p| !p.is_empty()));

        let highest_confidence_ailment = self
            .highest_confidence_ailment
            .or_else(|| analysis.as_ref().and_then(|a| a.primary_ailment().cloned()));

        let health_score = self
            .health_score
            .or_else(|| analysis.as_ref().and_then(|a| a.health_score));

        HealthReportView {
            report_id: self.report_id,
            record_id: self.id,
            symptom_id: self.symptom_id,
            patient_info: self.patient_info,
            medical_info: self.medical_info,
            transcript,
            symptoms,
            analysis,
            highest_confidence_ailment,
            health_score,
            generated_at: self.report_generated_at.or(self.created),
        }
    }
}

impl HealthReportView {
    /// Generation date formatted for display, or "Unknown date".
    pub fn generated_date_text(&self) -> String {
        format_iso_date(self.generated_at.as_deref())
    }

    /// Generation time-of-day formatted for display, or empty.
    pub fn generated_time_text(&self) -> String {
        self.generated_at
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| dt.format("%H:%M").to_string())
            .unwrap_or_default()
    }
}

/// `YYYY-MM-DD` from an ISO timestamp, or "Unknown date".
pub fn format_iso_date(timestamp: Option<&str>) -> String {
    timestamp
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "Unknown date".to_string())
}
