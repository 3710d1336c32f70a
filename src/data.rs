use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::coerce::Magnitude;
use crate::errors::DigestError;

pub use crate::types::{CategoryLabel, ItemId, PlatformName, SourceId};

/// Unvalidated key/value record produced by a source adapter.
///
/// No keys are guaranteed. Values may be native numbers, magnitude strings,
/// timestamps in assorted formats, or null.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: Map<String, Value>,
}

impl RawRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Raw field access, including nulls and empty strings.
    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Field access that treats null and blank strings as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|value| is_present(value))
    }

    /// First present value among `keys`, in order.
    pub fn first_present<'a, I>(&self, keys: I) -> Option<&Value>
    where
        I: IntoIterator<Item = &'a str>,
    {
        keys.into_iter().find_map(|key| self.get(key))
    }

    /// Field rendered as text; numbers and booleans are stringified.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(value_as_text)
    }

    /// First present field among `keys`, rendered as text.
    pub fn first_text<'a, I>(&self, keys: I) -> Option<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.first_present(keys).and_then(value_as_text)
    }

    /// Number of stored fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<Value> for RawRecord {
    type Error = DigestError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(DigestError::Configuration(format!(
                "raw record must be a JSON object, got {other}"
            ))),
        }
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.trim().is_empty(),
        _ => true,
    }
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Normalized, scored, deduplicated output unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanonicalItem {
    /// Identity key, unique within a digest.
    ///
    /// Records without an id field get `{source_id}_{fnv1a64(url)}` in hex,
    /// stable across runs and builds.
    pub id: ItemId,
    /// Platform display name.
    pub platform: PlatformName,
    /// Source display name.
    pub source: String,
    /// Classifier output; always a label of the active taxonomy.
    pub category: CategoryLabel,
    /// Display title; empty when absent.
    pub title: String,
    /// Body text; empty when absent.
    pub content: String,
    /// Canonical link; empty when absent.
    pub url: String,
    /// Author or owner; empty when absent.
    pub author: String,
    /// Magnitude exactly as received.
    pub raw_metric: Magnitude,
    /// `raw_metric` coerced to a number; `0.0` when unreadable.
    pub numeric_metric: f64,
    /// Parsed creation time, when one was derivable.
    pub created_at: Option<DateTime<Utc>>,
    /// Ingestion time stamped by the pipeline run.
    pub fetched_at: DateTime<Utc>,
    /// Score from the active scoring strategy.
    pub engagement_score: f64,
}
