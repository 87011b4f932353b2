use serde::{Deserialize, Serialize};

/// Per-user medical information document.
///
/// Created empty at registration and mutated wholesale by the medical-info
/// form (merge-upsert). All fields are free-text by contract; the form does
/// not parse them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalInformation {
    #[serde(default)]
    pub blood_type: String,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub allergies: String,
    #[serde(default)]
    pub medications: String,
    #[serde(default)]
    pub conditions: String,
    #[serde(default)]
    pub emergency_name: String,
    #[serde(default)]
    pub emergency_relation: String,
    #[serde(default)]
    pub emergency_phone: String,
}

/// Medical-history snapshot embedded in a health report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalSnapshot {
    #[serde(default)]
    pub blood_type: String,
    #[serde(default)]
    pub allergies: String,
    #[serde(default)]
    pub medications: String,
    #[serde(default)]
    pub conditions: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_sparse_documents() {
        let info: MedicalInformation =
            serde_json::from_str(r#"{"bloodType": "O+", "allergies": "penicillin"}"#).unwrap();
        assert_eq!(info.blood_type, "O+");
        assert_eq!(info.allergies, "penicillin");
        assert!(info.medications.is_empty());
    }

    #[test]
    fn serializes_camel_case() {
        let info = MedicalInformation {
            emergency_name: "Sam".into(),
            ..Default::default()
        };
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"emergencyName\""));
        assert!(json.contains("\"bloodType\""));
    }
}
