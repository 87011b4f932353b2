use serde::{Deserialize, Serialize};

/// Activity type tag, used to pick the feed icon and default wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    VoiceInput,
    MedicalInfo,
    HealthReport,
    /// Anything unrecognized renders as a generic entry.
    #[serde(other)]
    Generic,
}

impl ActivityKind {
    /// Font Awesome icon name for the feed item.
    pub fn icon(self) -> &'static str {
        match self {
            Self::VoiceInput => "fa-microphone",
            Self::MedicalInfo => "fa-file-medical",
            Self::HealthReport => "fa-chart-line",
            Self::Generic => "fa-info-circle",
        }
    }

    /// Feed item title.
    pub fn title(self) -> &'static str {
        match self {
            Self::VoiceInput => "Voice Recording",
            Self::MedicalInfo => "Medical Info Update",
            Self::HealthReport => "Health Report",
            Self::Generic => "Activity",
        }
    }

    /// Detail text used when the entry carries none.
    pub fn default_details(self) -> &'static str {
        match self {
            Self::VoiceInput => "Recorded voice symptoms for analysis",
            Self::MedicalInfo => "Updated medical information",
            Self::HealthReport => "Generated health report",
            Self::Generic => "User activity",
        }
    }
}

/// Append-only record in the `recentActivity` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    #[serde(default)]
    pub id: Option<String>,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    #[serde(default)]
    pub details: String,
    /// Server timestamp, ISO 8601; absent until the write settles.
    #[serde(default)]
    pub timestamp: Option<String>,
}
