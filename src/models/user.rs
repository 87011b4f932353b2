use serde::{Deserialize, Serialize};

/// Profile document mirrored from the `users` collection.
///
/// Created at registration; read-only afterwards from this client. The
/// identity provider owns the account itself; this is the app-level mirror.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Provider-issued user id; doubles as the document id.
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub role: String,
    /// Some older profiles carry `fullName` instead of `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl UserProfile {
    /// Display name, tolerating the `fullName` legacy field.
    pub fn display_name(&self) -> Option<&str> {
        if let Some(full) = self.full_name.as_deref() {
            if !full.is_empty() {
                return Some(full);
            }
        }
        if self.name.is_empty() {
            None
        } else {
            Some(&self.name)
        }
    }
}

/// Patient snapshot embedded in a health report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInfo {
    #[serde(default)]
    pub name: String,
    /// Free-form on the wire ("Unknown" when missing).
    #[serde(default)]
    pub age: serde_json::Value,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub email: String,
}

impl PatientInfo {
    /// Age rendered for display, whatever the wire carried.
    pub fn age_text(&self) -> String {
        match &self.age {
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) if !s.is_empty() => s.clone(),
            _ => "Not provided".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_full_name() {
        let profile = UserProfile {
            name: "J. Doe".into(),
            full_name: Some("Jane Doe".into()),
            ..Default::default()
        };
        assert_eq!(profile.display_name(), Some("Jane Doe"));
    }

    #[test]
    fn display_name_falls_back_to_name() {
        let profile = UserProfile {
            name: "Jane Doe".into(),
            ..Default::default()
        };
        assert_eq!(profile.display_name(), Some("Jane Doe"));
        assert_eq!(UserProfile::default().display_name(), None);
    }

    #[test]
    fn patient_age_tolerates_string_and_number() {
        let numeric: PatientInfo = serde_json::from_str(r#"{"age": 34}"#).unwrap();
        assert_eq!(numeric.age_text(), "34");
        let text: PatientInfo = serde_json::from_str(r#"{"age": "Unknown"}"#).unwrap();
        assert_eq!(text.age_text(), "Unknown");
        assert_eq!(PatientInfo::default().age_text(), "Not provided");
    }
}
