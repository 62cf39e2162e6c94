//! Document queries: type + predicates + order + projection.
//!
//! A [`DocumentQuery`] is plain data so it can travel over HTTP unchanged.
//! Stores evaluate it with [`DocumentQuery::run`], which keeps filtering and
//! ordering identical across backends.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Document;

/// A single filter condition over a dotted field path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// Field is present and equal to `value`. A missing field never matches.
    Eq { field: String, value: Value },
    /// Field is present and not `null`.
    Defined { field: String },
    /// Field is absent or `null`.
    Undefined { field: String },
}

impl Predicate {
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Predicate::Eq { field, value } => doc.get_path(field).as_ref() == Some(value),
            Predicate::Defined { field } => is_defined(doc.get_path(field)),
            Predicate::Undefined { field } => !is_defined(doc.get_path(field)),
        }
    }
}

fn is_defined(v: Option<Value>) -> bool {
    !matches!(v, None | Some(Value::Null))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    #[serde(default)]
    pub direction: Direction,
}

/// A query over documents of one type.
///
/// # Example
///
/// ```json
/// {
///   "type": "comment",
///   "filter": [
///     { "op": "eq", "field": "storyId._ref", "value": "story-1" },
///     { "op": "eq", "field": "isFlagged", "value": false },
///     { "op": "undefined", "field": "inlineMarker" }
///   ],
///   "order": { "field": "_createdAt", "direction": "desc" },
///   "projection": ["text", "flagCount"]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentQuery {
    #[serde(rename = "type")]
    pub doc_type: String,

    /// All predicates must hold.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<Predicate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,

    /// Non-system fields to return. `None` returns every field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl DocumentQuery {
    pub fn of_type(doc_type: impl Into<String>) -> Self {
        Self {
            doc_type: doc_type.into(),
            filter: Vec::new(),
            order: None,
            projection: None,
            limit: None,
        }
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.push(Predicate::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn where_defined(mut self, field: impl Into<String>) -> Self {
        self.filter.push(Predicate::Defined { field: field.into() });
        self
    }

    pub fn where_undefined(mut self, field: impl Into<String>) -> Self {
        self.filter.push(Predicate::Undefined { field: field.into() });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order = Some(Order {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn project<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// `true` if `doc` has the queried type and satisfies every predicate.
    pub fn matches(&self, doc: &Document) -> bool {
        doc.doc_type == self.doc_type && self.filter.iter().all(|p| p.matches(doc))
    }

    /// Evaluate the query over a set of candidate documents.
    pub fn run<'a, I>(&self, docs: I) -> Vec<Document>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut hits: Vec<&Document> = docs.into_iter().filter(|d| self.matches(d)).collect();

        if let Some(order) = &self.order {
            hits.sort_by(|a, b| {
                let ord = compare_values(
                    a.get_path(&order.field).as_ref(),
                    b.get_path(&order.field).as_ref(),
                )
                // UUIDv7 ids break ties in creation order.
                .then_with(|| a.id.cmp(&b.id));
                match order.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }

        if let Some(limit) = self.limit {
            hits.truncate(limit);
        }

        hits.into_iter()
            .map(|d| match &self.projection {
                Some(fields) => d.project(fields),
                None => d.clone(),
            })
            .collect()
    }
}

/// Total order used for sorting: missing < null < bool < number < string.
/// Arrays and objects sort after strings and compare equal to each other.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(_) => 5,
        }
    }
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Response body for `POST /v1/query`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResponse {
    pub documents: Vec<Document>,
}
