use serde::{Deserialize, Serialize};

use super::prediction::Prediction;

/// A symptom record as returned by `GET /api/health-reports/{userId}`.
///
/// Immutable from this client's perspective once created; the backend
/// attaches the prediction and status as the flow progresses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    /// Present once the ailment prediction has run for this record.
    #[serde(default, deserialize_with = "empty_object_as_none")]
    pub prediction: Option<Prediction>,
    /// ISO 8601 creation timestamp issued by the backend.
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub status: String,
}

/// The list endpoint serializes "no prediction yet" as `{}`; fold that
/// into `None` so render sites have a single check.
pub(crate) fn empty_object_as_none<'de, D>(deserializer: D) -> Result<Option<Prediction>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Prediction>::deserialize(deserializer)?;
    Ok(value.filter(|p| !p.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prediction_object_becomes_none() {
        let json = r#"{
            "id": "rec1",
            "transcript": "I have a headache",
            "symptoms": ["headache"],
            "prediction": {},
            "created": "2026-08-20T10:00:00Z",
            "status": "symptoms_identified"
        }"#;
        let record: SymptomRecord = serde_json::from_str(json).unwrap();
        assert!(record.prediction.is_none());
        assert_eq!(record.symptoms, vec!["headache"]);
    }

    #[test]
    fn populated_prediction_survives() {
        let json = r#"{
            "id": "rec2",
            "symptoms": ["fever"],
            "prediction": {"urgency": "high"}
        }"#;
        let record: SymptomRecord = serde_json::from_str(json).unwrap();
        assert!(record.prediction.is_some());
    }
}
