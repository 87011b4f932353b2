use serde::{Deserialize, Serialize};

use super::enums::{AppointmentStatus, UrgencyTier};
use super::prediction::Prediction;
use super::symptom::empty_object_as_none;

/// Patient snapshot embedded in an appointment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPatientInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// An appointment as returned by `GET /api/appointments/{userId}`.
///
/// Read-only in this client; status transitions happen backend-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(default)]
    pub id: String,
    /// Human-readable id (`APT_<uid>_<ts>`).
    #[serde(default)]
    pub appointment_id: String,
    #[serde(default)]
    pub patient_info: AppointmentPatientInfo,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default, deserialize_with = "empty_object_as_none")]
    pub ai_analysis: Option<Prediction>,
    #[serde(default)]
    pub preferred_date: Option<String>,
    #[serde(default)]
    pub preferred_time: Option<String>,
    #[serde(default = "UrgencyTier::default")]
    pub urgency: UrgencyTier,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "default_status")]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_status() -> AppointmentStatus {
    AppointmentStatus::Pending
}

/// Payload for `POST /api/book-appointment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub user_id: String,
    pub symptom_id: String,
    pub preferred_date: String,
    pub preferred_time: String,
    pub urgency: UrgencyTier,
    pub notes: String,
}
