//! Medical information page: load the per-user document into the form
//! and merge-upsert it on save.

use serde::Serialize;
use tracing::info;

use crate::activity;
use crate::firestore::DocumentStore;
use crate::models::{ActivityKind, MedicalInformation};

#[derive(Debug, thiserror::Error)]
pub enum MedicalInfoError {
    #[error("{0}")]
    Store(#[from] crate::firestore::StoreError),
}

/// Save result, shaped for the page banner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    pub message: String,
}

/// Load the user's document; a missing one yields the empty form.
pub fn load(store: &dyn DocumentStore, uid: &str) -> Result<MedicalInformation, MedicalInfoError> {
    Ok(store.medical_information(uid)?.unwrap_or_default())
}

/// Merge-upsert the form contents and record the update in the feed.
pub fn save(
    store: &dyn DocumentStore,
    uid: &str,
    info: &MedicalInformation,
) -> Result<SaveOutcome, MedicalInfoError> {
    store.save_medical_information(uid, info)?;
    info!(%uid, "Medical information saved");
    activity::log_activity(
        store,
        uid,
        ActivityKind::MedicalInfo,
        "Updated medical information",
    );
    Ok(SaveOutcome {
        message: "Medical information saved successfully.".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeStore;

    #[test]
    fn missing_document_loads_empty_form() {
        let store = FakeStore::new();
        let info = load(&store, "u1").unwrap();
        assert_eq!(info, MedicalInformation::default());
    }

    #[test]
    fn save_upserts_and_logs_activity() {
        let store = FakeStore::new();
        let info = MedicalInformation {
            blood_type: "O+".into(),
            allergies: "penicillin".into(),
            ..Default::default()
        };

        let outcome = save(&store, "u1", &info).unwrap();
        assert_eq!(outcome.message, "Medical information saved successfully.");
        assert_eq!(load(&store, "u1").unwrap().blood_type, "O+");

        let activities = store.activities.lock().unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].kind, ActivityKind::MedicalInfo);
        assert_eq!(activities[0].details, "Updated medical information");
    }

    #[test]
    fn store_failure_surfaces_on_save() {
        let store = FakeStore::new();
        *store.fail.lock().unwrap() = true;
        assert!(save(&store, "u1", &MedicalInformation::default()).is_err());
    }
}
