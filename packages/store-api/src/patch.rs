//! Partial updates committed as one logical write.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::{Document, SYSTEM_FIELDS};
use crate::store::StoreError;

/// A set of field operations applied to one document atomically.
///
/// Operations run in a fixed order: `set_if_missing`, then `inc`, then
/// `set`. Keys are top-level field names. `inc` treats a missing field as
/// `0`.
///
/// When `if_revision` is set, the patch only commits if the document's
/// current `_rev` matches; otherwise the store reports
/// [`StoreError::Conflict`] and nothing changes.
///
/// ```json
/// {
///   "setIfMissing": { "helpfulCount": 0, "notHelpfulCount": 0 },
///   "inc": { "helpfulCount": 1 }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub set_if_missing: Map<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inc: BTreeMap<String, i64>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub set: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_revision: Option<String>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_if_missing(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_if_missing.insert(field.into(), value.into());
        self
    }

    pub fn inc(mut self, field: impl Into<String>, by: i64) -> Self {
        *self.inc.entry(field.into()).or_insert(0) += by;
        self
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.insert(field.into(), value.into());
        self
    }

    pub fn if_revision(mut self, rev: impl Into<String>) -> Self {
        self.if_revision = Some(rev.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.set_if_missing.is_empty() && self.inc.is_empty() && self.set.is_empty()
    }

    /// Apply to `doc` in place and bump its revision.
    ///
    /// On error `doc` is left untouched.
    pub fn apply(&self, doc: &mut Document) -> Result<(), StoreError> {
        if let Some(expected) = &self.if_revision {
            if *expected != doc.rev {
                return Err(StoreError::Conflict(format!(
                    "document {} is at revision {}, expected {}",
                    doc.id, doc.rev, expected
                )));
            }
        }

        let touched = self
            .set_if_missing
            .keys()
            .chain(self.inc.keys())
            .chain(self.set.keys());
        for key in touched {
            if SYSTEM_FIELDS.contains(&key.as_str()) {
                return Err(StoreError::Invalid(format!("cannot patch system field {key}")));
            }
        }

        let mut fields = doc.fields.clone();

        for (key, value) in &self.set_if_missing {
            fields.entry(key.clone()).or_insert_with(|| value.clone());
        }

        for (key, by) in &self.inc {
            let current = match fields.get(key) {
                None | Some(Value::Null) => 0,
                Some(Value::Number(n)) => n.as_i64().ok_or_else(|| {
                    StoreError::Invalid(format!("field {key} is not an integer"))
                })?,
                Some(_) => {
                    return Err(StoreError::Invalid(format!("field {key} is not a number")))
                }
            };
            fields.insert(key.clone(), Value::from(current.saturating_add(*by)));
        }

        for (key, value) in &self.set {
            fields.insert(key.clone(), value.clone());
        }

        doc.fields = fields;
        doc.touch();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource() -> Document {
        Document::new("resource", json!({ "title": "Legal aid" }).as_object().cloned().unwrap())
    }

    #[test]
    fn set_if_missing_then_inc() {
        let mut d = resource();
        Patch::new()
            .set_if_missing("helpfulCount", 0)
            .set_if_missing("notHelpfulCount", 0)
            .inc("helpfulCount", 1)
            .apply(&mut d)
            .unwrap();
        assert_eq!(d.fields["helpfulCount"], 1);
        assert_eq!(d.fields["notHelpfulCount"], 0);

        // Existing values are not reset by set_if_missing.
        Patch::new()
            .set_if_missing("helpfulCount", 0)
            .inc("helpfulCount", 1)
            .apply(&mut d)
            .unwrap();
        assert_eq!(d.fields["helpfulCount"], 2);
    }

    #[test]
    fn inc_on_missing_field_starts_from_zero() {
        let mut d = resource();
        Patch::new().inc("views", 3).apply(&mut d).unwrap();
        assert_eq!(d.fields["views"], 3);
    }

    #[test]
    fn inc_on_text_field_is_rejected_without_changes() {
        let mut d = resource();
        let before = d.clone();
        let err = Patch::new().set("x", 1).inc("title", 1).apply(&mut d).unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
        assert_eq!(d, before);
    }

    #[test]
    fn stale_revision_conflicts() {
        let mut d = resource();
        let rev = d.rev.clone();
        Patch::new().set("a", 1).if_revision(&rev).apply(&mut d).unwrap();
        let err = Patch::new().set("a", 2).if_revision(&rev).apply(&mut d).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(d.fields["a"], 1);
    }

    #[test]
    fn system_fields_are_protected() {
        let mut d = resource();
        let err = Patch::new().set("_type", "comment").apply(&mut d).unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[test]
    fn wire_format_is_camel_case() {
        let p = Patch::new().set_if_missing("helpfulCount", 0).inc("helpfulCount", 1);
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["setIfMissing"]["helpfulCount"], 0);
        assert_eq!(v["inc"]["helpfulCount"], 1);
        assert!(v.get("set").is_none());
    }
}
