//! Lossless transformation between a submitted field set (mixed text and
//! binary values) and a storage-safe JSON structure.
//!
//! Text fields are stored verbatim under a `STRING` marker; binary fields are
//! base64-encoded under a `BLOB` marker with their content type alongside.
//! `decode(encode(x)) == x` holds for any mix of text and binary fields,
//! including empty values and blobs containing arbitrary byte sequences.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Map, Value, json};

use crate::error::RelayError;

const MARKER_STRING: &str = "STRING";
const MARKER_BLOB: &str = "BLOB";

/// Content type assumed for a blob whose metadata carries none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A single submitted field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Bytes { data: Vec<u8>, content_type: String },
}

/// A submitted field set. Insertion is last-write-wins per field name:
/// submitting the same name twice keeps only the final value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmartFormPayload {
    fields: BTreeMap<String, FieldValue>,
}

impl SmartFormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn insert_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.insert(name, FieldValue::Text(value.into()));
    }

    /// Returns the field's text content, or `None` when absent or binary.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn has_binary(&self) -> bool {
        self.fields
            .values()
            .any(|v| matches!(v, FieldValue::Bytes { .. }))
    }
}

/// Encode a field set into its storage-safe JSON form.
pub fn encode(payload: &SmartFormPayload) -> Value {
    let mut out = Map::new();
    for (name, value) in payload.iter() {
        let entry = match value {
            FieldValue::Text(text) => json!({
                "marker": MARKER_STRING,
                "value": text,
            }),
            FieldValue::Bytes { data, content_type } => json!({
                "marker": MARKER_BLOB,
                "value": BASE64.encode(data),
                "metadata": { "type": content_type },
            }),
        };
        out.insert(name.clone(), entry);
    }
    Value::Object(out)
}

/// Decode a storage-safe JSON form back into the original field set.
///
/// Fails with `InvalidFieldMarker` on any marker other than `STRING`/`BLOB`,
/// and `InvalidPayload` on structural damage (non-object entries, missing
/// values, malformed base64).
pub fn decode(value: &Value) -> Result<SmartFormPayload, RelayError> {
    let entries = value
        .as_object()
        .ok_or_else(|| RelayError::InvalidPayload("payload is not a JSON object".to_owned()))?;

    let mut payload = SmartFormPayload::new();
    for (name, entry) in entries {
        let entry = entry.as_object().ok_or_else(|| {
            RelayError::InvalidPayload(format!("field {name:?} is not an object"))
        })?;

        let marker = entry
            .get("marker")
            .and_then(Value::as_str)
            .ok_or_else(|| RelayError::InvalidPayload(format!("field {name:?} has no marker")))?;

        let raw = entry
            .get("value")
            .and_then(Value::as_str)
            .ok_or_else(|| RelayError::InvalidPayload(format!("field {name:?} has no value")))?;

        let value = match marker {
            MARKER_STRING => FieldValue::Text(raw.to_owned()),
            MARKER_BLOB => {
                let data = BASE64.decode(raw).map_err(|e| {
                    RelayError::InvalidPayload(format!("field {name:?}: invalid base64: {e}"))
                })?;
                let content_type = entry
                    .get("metadata")
                    .and_then(|m| m.get("type"))
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_owned();
                FieldValue::Bytes { data, content_type }
            }
            other => return Err(RelayError::InvalidFieldMarker(other.to_owned())),
        };
        payload.insert(name.clone(), value);
    }
    Ok(payload)
}
