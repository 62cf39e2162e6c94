//! The unit of storage: a typed JSON document with system fields.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field names the store manages itself. Writers may not set them.
pub const SYSTEM_FIELDS: [&str; 5] = ["_id", "_type", "_createdAt", "_updatedAt", "_rev"];

/// A stored document.
///
/// # Example
///
/// ```json
/// {
///   "_id": "01953c1e-7a40-7c3e-a0b4-1d2e3f4a5b6c",
///   "_type": "comment",
///   "_createdAt": "2026-02-18T12:00:00.000000000Z",
///   "_updatedAt": "2026-02-18T12:00:00.000000000Z",
///   "_rev": "01953c1e-7a40-7c3e-a0b4-1d2e3f4a5b6d",
///   "text": "Thank you for sharing this.",
///   "flagCount": 0,
///   "isFlagged": false
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// UUIDv7 identifier, assigned by the store.
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_type")]
    pub doc_type: String,

    #[serde(rename = "_createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "_updatedAt")]
    pub updated_at: DateTime<Utc>,

    /// Changes on every committed write; used for optimistic concurrency.
    #[serde(rename = "_rev")]
    pub rev: String,

    /// Everything that is not a system field.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Build a fresh document with a new id and revision. System fields
    /// present in `fields` are discarded.
    pub fn new(doc_type: impl Into<String>, mut fields: Map<String, Value>) -> Self {
        for key in SYSTEM_FIELDS {
            fields.remove(key);
        }
        let now = Utc::now();
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            doc_type: doc_type.into(),
            created_at: now,
            updated_at: now,
            rev: uuid::Uuid::now_v7().to_string(),
            fields,
        }
    }

    /// Mark the document as modified: bump the revision and `_updatedAt`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.rev = uuid::Uuid::now_v7().to_string();
    }

    /// Look up a field by dotted path, e.g. `storyId._ref` or
    /// `inlineMarker.paragraphIndex`.
    ///
    /// System timestamps are returned as fixed-width RFC 3339 strings so they
    /// compare correctly as text.
    pub fn get_path(&self, path: &str) -> Option<Value> {
        match path {
            "_id" => return Some(Value::String(self.id.clone())),
            "_type" => return Some(Value::String(self.doc_type.clone())),
            "_rev" => return Some(Value::String(self.rev.clone())),
            "_createdAt" => return Some(Value::String(fixed_width(self.created_at))),
            "_updatedAt" => return Some(Value::String(fixed_width(self.updated_at))),
            _ => {}
        }
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.fields.get(first)?;
        for seg in segments {
            current = current.get(seg)?;
        }
        Some(current.clone())
    }

    /// Keep only the named fields (system fields are always kept).
    pub fn project(&self, fields: &[String]) -> Document {
        let kept = self
            .fields
            .iter()
            .filter(|(k, _)| fields.iter().any(|f| f == *k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Document {
            fields: kept,
            ..self.clone()
        }
    }

    /// Deserialize the whole document (system fields included) into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(serde_json::to_value(self)?)
    }
}

fn fixed_width(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Request body for creating a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewDocument {
    #[serde(rename = "_type")]
    pub doc_type: String,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl NewDocument {
    /// Build from any serialisable value that encodes to a JSON object.
    ///
    /// Returns `None` if `value` does not serialise to an object.
    pub fn from_serialize<T: Serialize>(doc_type: impl Into<String>, value: &T) -> Option<Self> {
        match serde_json::to_value(value).ok()? {
            Value::Object(fields) => Some(Self {
                doc_type: doc_type.into(),
                fields,
            }),
            _ => None,
        }
    }
}
