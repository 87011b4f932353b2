//! Shared tier and status enums with their badge presentation classes.
//!
//! The confidence/urgency badge colors and status colors are part of the
//! observable page contract (the frontend styles badges with these exact
//! utility classes), so they live next to the enums rather than in the
//! renderer.

use serde::{Deserialize, Serialize};

/// Confidence tier attached to a predicted ailment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    /// Ordering rank: high outranks medium outranks low.
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    /// Badge classes for the confidence pill.
    pub fn badge_classes(self) -> &'static str {
        match self {
            Self::High => "bg-red-100 text-red-800",
            Self::Medium => "bg-yellow-100 text-yellow-800",
            Self::Low => "bg-green-100 text-green-800",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency tier attached to a prediction or an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyTier {
    Low,
    Medium,
    High,
}

impl UrgencyTier {
    /// Badge classes for the urgency pill (report renderer).
    pub fn badge_classes(self) -> &'static str {
        match self {
            Self::High => "bg-red-100 text-red-800",
            Self::Medium => "bg-yellow-100 text-yellow-800",
            Self::Low => "bg-green-100 text-green-800",
        }
    }

    /// Text color for the appointments list badge.
    pub fn text_color(self) -> &'static str {
        match self {
            Self::High => "text-red-600",
            Self::Medium => "text-yellow-600",
            Self::Low => "text-green-600",
        }
    }

    /// Icon shown next to the urgency badge.
    pub fn icon(self) -> &'static str {
        match self {
            Self::High => "exclamation-triangle",
            Self::Medium => "clock",
            Self::Low => "check-circle",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Default for UrgencyTier {
    fn default() -> Self {
        Self::Medium
    }
}

impl std::fmt::Display for UrgencyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Appointment lifecycle status, owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    /// Text color for the appointments list badge.
    pub fn text_color(self) -> &'static str {
        match self {
            Self::Confirmed => "text-green-600",
            Self::Pending => "text-yellow-600",
            Self::Cancelled => "text-red-600",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
