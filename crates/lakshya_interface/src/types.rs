//! Document store value types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::str::FromStr;

/// Location of a document: `collection/id`.
///
/// # Examples
///
/// ```
/// use lakshya_interface::DocumentPath;
///
/// let path: DocumentPath = "chat_sessions/abc".parse().unwrap();
/// assert_eq!(path.collection, "chat_sessions");
/// assert_eq!(path.id, "abc");
/// assert_eq!(path.to_string(), "chat_sessions/abc");
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("{}/{}", collection, id)]
pub struct DocumentPath {
    /// Collection name
    pub collection: String,
    /// Document id within the collection
    pub id: String,
}

impl DocumentPath {
    /// Build a path from its parts.
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

impl FromStr for DocumentPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((collection, id))
                if !collection.is_empty() && !id.is_empty() && !id.contains('/') =>
            {
                Ok(Self::new(collection, id))
            }
            _ => Err(format!("expected 'collection/id', got '{}'", s)),
        }
    }
}

/// A stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Where the document lives
    pub path: DocumentPath,
    /// Document body
    pub data: Value,
}

/// Comparison applied by a [`Filter`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FilterOp {
    /// Field equals value
    Eq,
    /// Field differs from value
    Ne,
    /// Field is less than value
    Lt,
    /// Field is less than or equal to value
    Le,
    /// Field is greater than value
    Gt,
    /// Field is greater than or equal to value
    Ge,
    /// Array field holds the value, or string field contains it; strings
    /// compare case-insensitively
    Contains,
    /// Field equals one of the values in an array
    In,
}

/// Predicate on one (possibly dotted) field of a document.
///
/// # Examples
///
/// ```
/// use lakshya_interface::{Filter, FilterOp};
/// use serde_json::json;
///
/// let filter = Filter::new("location.city", FilterOp::Eq, json!("Pune"));
/// assert!(filter.matches(&json!({"location": {"city": "Pune"}})));
/// assert!(!filter.matches(&json!({"location": {"city": "Delhi"}})));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Field path, dot separated
    pub field: String,
    /// Comparison
    pub op: FilterOp,
    /// Value to compare against
    pub value: Value,
}

impl Filter {
    /// Build a filter.
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Shorthand for an equality filter.
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    /// Whether `document` satisfies the filter. Missing fields never match.
    pub fn matches(&self, document: &Value) -> bool {
        let Some(actual) = lookup(document, &self.field) else {
            return false;
        };
        match self.op {
            FilterOp::Eq => actual == &self.value,
            FilterOp::Ne => actual != &self.value,
            FilterOp::Lt => compare(actual, &self.value) == Some(Ordering::Less),
            FilterOp::Le => matches!(
                compare(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOp::Gt => compare(actual, &self.value) == Some(Ordering::Greater),
            FilterOp::Ge => matches!(
                compare(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Contains => match (actual, &self.value) {
                (Value::Array(items), Value::String(needle)) => items.iter().any(|item| {
                    item.as_str()
                        .is_some_and(|item| item.to_lowercase() == needle.to_lowercase())
                }),
                (Value::Array(items), needle) => items.contains(needle),
                (Value::String(haystack), Value::String(needle)) => haystack
                    .to_lowercase()
                    .contains(&needle.to_lowercase()),
                _ => false,
            },
            FilterOp::In => match &self.value {
                Value::Array(candidates) => candidates.contains(actual),
                _ => false,
            },
        }
    }
}

fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |current, segment| current.get(segment))
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
