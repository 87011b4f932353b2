use serde::{Deserialize, Serialize};

use super::enums::{ConfidenceTier, UrgencyTier};

/// One candidate ailment from the prediction backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PossibleAilment {
    pub name: String,
    #[serde(default = "default_confidence")]
    pub confidence: ConfidenceTier,
    #[serde(default)]
    pub description: String,
}

fn default_confidence() -> ConfidenceTier {
    ConfidenceTier::Low
}

/// Structured prediction bundle returned by `POST /api/predict-ailment`
/// and embedded into health reports as `aiAnalysis`.
///
/// Not persisted by this client directly; held only for the page lifetime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    #[serde(default)]
    pub possible_ailments: Vec<PossibleAilment>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<UrgencyTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_see_doctor: Option<bool>,
    /// Optional explicit score some report generations carry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_score: Option<f64>,
    /// Pre-computed primary diagnosis on some embedded analyses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highest_confidence_ailment: Option<PossibleAilment>,
}

impl Prediction {
    /// Whether anything is worth rendering at all.
    pub fn is_empty(&self) -> bool {
        self.possible_ailments.is_empty()
            && self.recommendations.is_empty()
            && self.urgency.is_none()
            && self.should_see_doctor.is_none()
    }

    /// The highest-confidence ailment, ties broken by first-encountered
    /// order (matches the report generator's selection).
    pub fn primary_ailment(&self) -> Option<&PossibleAilment> {
        if let Some(ref pre) = self.highest_confidence_ailment {
            return Some(pre);
        }
        let best = self
            .possible_ailments
            .iter()
            .map(|a| a.confidence.rank())
            .max()?;
        self.possible_ailments
            .iter()
            .find(|a| a.confidence.rank() == best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ailment(name: &str, confidence: ConfidenceTier) -> PossibleAilment {
        PossibleAilment {
            name: name.into(),
            confidence,
            description: String::new(),
        }
    }

    #[test]
    fn deserializes_backend_shape() {
        let json = r#"{
            "possibleAilments": [
                {"name": "Migraine", "confidence": "high", "description": "Recurring headache"}
            ],
            "recommendations": ["Rest", "Hydration"],
            "urgency": "medium",
            "shouldSeeDoctor": true
        }"#;
        let prediction: Prediction = serde_json::from_str(json).unwrap();
        assert_eq!(prediction.possible_ailments.len(), 1);
        assert_eq!(prediction.urgency, Some(UrgencyTier::Medium));
        assert_eq!(prediction.should_see_doctor, Some(true));
        assert!(!prediction.is_empty());
    }

    #[test]
    fn empty_object_is_empty() {
        let prediction: Prediction = serde_json::from_str("{}").unwrap();
        assert!(prediction.is_empty());
        assert!(prediction.primary_ailment().is_none());
    }

    #[test]
    fn primary_ailment_picks_highest_confidence() {
        let prediction = Prediction {
            possible_ailments: vec![
                ailment("Tension headache", ConfidenceTier::Medium),
                ailment("Migraine", ConfidenceTier::High),
                ailment("Sinusitis", ConfidenceTier::Low),
            ],
            ..Default::default()
        };
        assert_eq!(prediction.primary_ailment().unwrap().name, "Migraine");
    }

    #[test]
    fn primary_ailment_ties_break_first_encountered() {
        let prediction = Prediction {
            possible_ailments: vec![
                ailment("Common cold", ConfidenceTier::Medium),
                ailment("Influenza", ConfidenceTier::Medium),
            ],
            ..Default::default()
        };
        assert_eq!(prediction.primary_ailment().unwrap().name, "Common cold");
    }

    #[test]
    fn precomputed_primary_wins() {
        let prediction = Prediction {
            possible_ailments: vec![ailment("Migraine", ConfidenceTier::High)],
            highest_confidence_ailment: Some(ailment("Cluster headache", ConfidenceTier::Low)),
            ..Default::default()
        };
        assert_eq!(
            prediction.primary_ailment().unwrap().name,
            "Cluster headache"
        );
    }
}
