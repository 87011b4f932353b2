//! Document store access (Firestore REST API).
//!
//! The client touches four collections directly: `users` (one profile
//! document per uid), `medicalInformation` (one document per uid,
//! merge-upserted), `healthReports` (queried for the dashboard trends
//! and the last-report summary), and `recentActivity` (append-only
//! feed, four most recent shown).
//!
//! Firestore's wire format wraps every field in a typed value object
//! (`{"stringValue": …}`); the codec at the bottom folds that to and
//! from plain JSON so the model types keep their ordinary serde derives.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::models::{ActivityEntry, MedicalInformation, RawHealthReport, UserProfile};

const FIRESTORE_BASE: &str = "https://firestore.googleapis.com/v1";

/// How many feed entries the dashboard shows.
pub const RECENT_ACTIVITY_LIMIT: usize = 4;

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

/// Errors from document-store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Could not reach the document store")]
    Connection,
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error("Document store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to parse document: {0}")]
    Decode(String),
}

// ═══════════════════════════════════════════════════════════
// Trait
// ═══════════════════════════════════════════════════════════

/// The document-store surface the page flows depend on.
pub trait DocumentStore {
    fn user_profile(&self, uid: &str) -> Result<Option<UserProfile>, StoreError>;
    fn save_user_profile(&self, profile: &UserProfile) -> Result<(), StoreError>;
    fn medical_information(&self, uid: &str) -> Result<Option<MedicalInformation>, StoreError>;
    /// Merge-upsert: only the supplied fields are replaced.
    fn save_medical_information(
        &self,
        uid: &str,
        info: &MedicalInformation,
    ) -> Result<(), StoreError>;
    /// All reports for a user, oldest first (trend order).
    fn health_reports(&self, user_id: &str) -> Result<Vec<RawHealthReport>, StoreError>;
    /// Most recently generated report, if any.
    fn latest_report(&self, user_id: &str) -> Result<Option<RawHealthReport>, StoreError>;
    /// Newest-first feed entries, capped at `limit`.
    fn recent_activity(&self, user_id: &str, limit: usize) -> Result<Vec<ActivityEntry>, StoreError>;
    fn append_activity(&self, entry: &ActivityEntry) -> Result<(), StoreError>;
}

// ═══════════════════════════════════════════════════════════
// REST client
// ═══════════════════════════════════════════════════════════

/// Firestore REST client scoped to one project's default database.
pub struct FirestoreClient {
    base_url: String,
    project_id: String,
    id_token: String,
    client: reqwest::blocking::Client,
}

impl FirestoreClient {
    pub fn new(project_id: &str, id_token: &str) -> Self {
        Self::with_base_url(FIRESTORE_BASE, project_id, id_token)
    }

    pub fn with_base_url(base_url: &str, project_id: &str, id_token: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            id_token: id_token.to_string(),
            client,
        }
    }

    fn documents_root(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents",
            self.base_url, self.project_id
        )
    }

    fn send(&self, request: reqwest::blocking::RequestBuilder) -> Result<Value, StoreError> {
        let response = request
            .bearer_auth(&self.id_token)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    StoreError::Connection
                } else {
                    StoreError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(Value::Null);
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response.json().map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// Fetch one document as plain JSON; `None` when it does not exist.
    fn get_document(&self, collection: &str, doc_id: &str) -> Result<Option<Value>, StoreError> {
        let url = format!("{}/{}/{}", self.documents_root(), collection, doc_id);
        let raw = self.send(self.client.get(&url))?;
        if raw.is_null() {
            return Ok(None);
        }
        Ok(Some(document_to_json(&raw)))
    }

    /// Merge-upsert: patch with an update mask listing exactly the
    /// supplied fields, so absent fields keep their stored values.
    fn merge_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        let mut url = format!("{}/{}/{}?", self.documents_root(), collection, doc_id);
        for name in fields.keys() {
            url.push_str(&format!("updateMask.fieldPaths={name}&"));
        }
        let body = json!({ "fields": encode_fields(fields) });
        self.send(self.client.patch(url.trim_end_matches('&')).json(&body))?;
        Ok(())
    }

    /// Append a document with a server-assigned id.
    fn create_document(
        &self,
        collection: &str,
        fields: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        let url = format!("{}/{}", self.documents_root(), collection);
        let body = json!({ "fields": encode_fields(fields) });
        self.send(self.client.post(&url).json(&body))?;
        Ok(())
    }

    /// Run a structured query filtered on `userId`, returning plain-JSON
    /// documents with their ids spliced in.
    fn query_by_user(
        &self,
        collection: &str,
        user_id: &str,
        order_by: Option<(&str, &str)>,
        limit: Option<usize>,
    ) -> Result<Vec<Value>, StoreError> {
        let mut query = json!({
            "from": [{ "collectionId": collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": "userId" },
                    "op": "EQUAL",
                    "value": { "stringValue": user_id }
                }
            }
        });
        if let Some((field, direction)) = order_by {
            query["orderBy"] = json!([{
                "field": { "fieldPath": field },
                "direction": direction
            }]);
        }
        if let Some(limit) = limit {
            query["limit"] = json!(limit);
        }

        let url = format!("{}:runQuery", self.documents_root());
        let raw = self.send(self.client.post(&url).json(&json!({ "structuredQuery": query })))?;

        let rows = raw.as_array().cloned().unwrap_or_default();
        let mut documents = Vec::new();
        for row in &rows {
            if let Some(doc) = row.get("document") {
                documents.push(document_to_json(doc));
            }
        }
        debug!(collection, count = documents.len(), "Document query complete");
        Ok(documents)
    }
}

fn decode_into<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Decode(e.to_string()))
}

fn to_field_map<T: serde::Serialize>(value: &T) -> Result<Map<String, Value>, StoreError> {
    match serde_json::to_value(value).map_err(|e| StoreError::Decode(e.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Decode(format!(
            "Expected an object, got: {other}"
        ))),
    }
}

impl DocumentStore for FirestoreClient {
    fn user_profile(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        match self.get_document("users", uid)? {
            Some(doc) => Ok(Some(decode_into(doc)?)),
            None => Ok(None),
        }
    }

    fn save_user_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let fields = to_field_map(profile)?;
        self.merge_document("users", &profile.uid, &fields)
    }

    fn medical_information(&self, uid: &str) -> Result<Option<MedicalInformation>, StoreError> {
        match self.get_document("medicalInformation", uid)? {
            Some(doc) => Ok(Some(decode_into(doc)?)),
            None => Ok(None),
        }
    }

    fn save_medical_information(
        &self,
        uid: &str,
        info: &MedicalInformation,
    ) -> Result<(), StoreError> {
        let mut fields = to_field_map(info)?;
        fields.insert("userId".to_string(), Value::String(uid.to_string()));
        fields.insert(
            "updatedAt".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
        self.merge_document("medicalInformation", uid, &fields)
    }

    fn health_reports(&self, user_id: &str) -> Result<Vec<RawHealthReport>, StoreError> {
        let docs = self.query_by_user("healthReports", user_id, Some(("created", "ASCENDING")), None)?;
        docs.into_iter().map(decode_into).collect()
    }

    fn latest_report(&self, user_id: &str) -> Result<Option<RawHealthReport>, StoreError> {
        let docs = self.query_by_user(
            "healthReports",
            user_id,
            Some(("reportGeneratedAt", "DESCENDING")),
            Some(1),
        )?;
        docs.into_iter().next().map(decode_into).transpose()
    }

    fn recent_activity(&self, user_id: &str, limit: usize) -> Result<Vec<ActivityEntry>, StoreError> {
        let docs = self.query_by_user(
            "recentActivity",
            user_id,
            Some(("timestamp", "DESCENDING")),
            Some(limit),
        )?;
        docs.into_iter().map(decode_into).collect()
    }

    fn append_activity(&self, entry: &ActivityEntry) -> Result<(), StoreError> {
        let mut fields = to_field_map(entry)?;
        fields.remove("id");
        fields.insert(
            "timestamp".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
        self.create_document("recentActivity", &fields)
    }
}

// ═══════════════════════════════════════════════════════════
// Typed-value codec
// ═══════════════════════════════════════════════════════════

/// Flatten a Firestore document resource to plain JSON, splicing the
/// document id (the last path segment of `name`) in as `"id"`.
fn document_to_json(document: &Value) -> Value {
    let mut out = Map::new();
    if let Some(fields) = document.get("fields").and_then(Value::as_object) {
        // BTreeMap gives a stable field order for tests and logs.
        let sorted: BTreeMap<_, _> = fields.iter().collect();
        for (name, value) in sorted {
            out.insert(name.clone(), decode_value(value));
        }
    }
    if let Some(name) = document.get("name").and_then(Value::as_str) {
        if let Some(id) = name.rsplit('/').next() {
            out.entry("id".to_string())
                .or_insert_with(|| Value::String(id.to_string()));
        }
    }
    Value::Object(out)
}

fn decode_value(value: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return Value::Null;
    };
    if let Some(s) = obj.get("stringValue") {
        return s.clone();
    }
    if let Some(s) = obj.get("timestampValue") {
        return s.clone();
    }
    if let Some(n) = obj.get("integerValue").and_then(Value::as_str) {
        // Firestore sends integers as strings.
        if let Ok(parsed) = n.parse::<i64>() {
            return json!(parsed);
        }
    }
    if let Some(n) = obj.get("doubleValue") {
        return n.clone();
    }
    if let Some(b) = obj.get("booleanValue") {
        return b.clone();
    }
    if obj.contains_key("nullValue") {
        return Value::Null;
    }
    if let Some(arr) = obj
        .get("arrayValue")
        .and_then(|a| a.get("values"))
        .and_then(Value::as_array)
    {
        return Value::Array(arr.iter().map(decode_value).collect());
    }
    if let Some(fields) = obj
        .get("mapValue")
        .and_then(|m| m.get("fields"))
        .and_then(Value::as_object)
    {
        let mut out = Map::new();
        for (name, v) in fields {
            out.insert(name.clone(), decode_value(v));
        }
        return Value::Object(out);
    }
    Value::Null
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(fields) => json!({
            "mapValue": { "fields": encode_fields(fields) }
        }),
    }
}

fn encode_fields(fields: &Map<String, Value>) -> Value {
    let mut out = Map::new();
    for (name, value) in fields {
        out.insert(name.clone(), encode_value(value));
    }
    Value::Object(out)
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_document_with_id_from_name() {
        let doc = json!({
            "name": "projects/p/databases/(default)/documents/healthReports/doc42",
            "fields": {
                "userId": { "stringValue": "u1" },
                "healthScore": { "integerValue": "80" },
                "symptoms": { "arrayValue": { "values": [
                    { "stringValue": "headache" },
                    { "stringValue": "fever" }
                ]}},
                "aiAnalysis": { "mapValue": { "fields": {
                    "urgency": { "stringValue": "low" },
                    "shouldSeeDoctor": { "booleanValue": false }
                }}}
            }
        });
        let plain = document_to_json(&doc);
        assert_eq!(plain["id"], "doc42");
        assert_eq!(plain["userId"], "u1");
        assert_eq!(plain["healthScore"], 80);
        assert_eq!(plain["symptoms"], json!(["headache", "fever"]));
        assert_eq!(plain["aiAnalysis"]["urgency"], "low");
        assert_eq!(plain["aiAnalysis"]["shouldSeeDoctor"], false);
    }

    #[test]
    fn explicit_id_field_wins_over_document_name() {
        let doc = json!({
            "name": ".../documents/users/fallback",
            "fields": { "id": { "stringValue": "explicit" } }
        });
        assert_eq!(document_to_json(&doc)["id"], "explicit");
    }

    #[test]
    fn encode_round_trips_plain_json() {
        let original = json!({
            "bloodType": "O+",
            "allergies": "penicillin",
            "score": 72.5,
            "count": 3,
            "flags": [true, false],
            "nested": { "a": null }
        });
        let Value::Object(fields) = original.clone() else {
            panic!("fixture must be an object");
        };
        let encoded = encode_fields(&fields);

        let wrapped = json!({ "fields": encoded });
        let decoded = document_to_json(&wrapped);
        for key in ["bloodType", "allergies", "score", "count", "flags", "nested"] {
            assert_eq!(decoded[key], original[key], "field {key}");
        }
    }

    #[test]
    fn report_document_decodes_into_model() {
        let doc = json!({
            "name": ".../documents/healthReports/r1",
            "fields": {
                "userId": { "stringValue": "u1" },
                "symptoms": { "arrayValue": { "values": [{ "stringValue": "cough" }] } },
                "created": { "timestampValue": "2026-08-20T10:00:00Z" }
            }
        });
        let report: RawHealthReport = decode_into(document_to_json(&doc)).unwrap();
        assert_eq!(report.id.as_deref(), Some("r1"));
        assert_eq!(report.symptoms.as_deref(), Some(&["cough".to_string()][..]));
        assert_eq!(report.created.as_deref(), Some("2026-08-20T10:00:00Z"));
    }
}
