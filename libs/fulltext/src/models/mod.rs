//! Domain models shared by the search pipeline

pub mod target;

pub use target::{TargetConfig, TargetRegistry};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

use crate::Result;

/// A fully populated domain record: column name to value.
pub type Record = Map<String, JsonValue>;

/// Identifier of a stored record.
///
/// Integer keys are the common case; text keys cover UUID/slug primary keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    /// Read an identifier out of a decoded column value.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Number(n) => n
                .as_i64()
                .map(RecordId::Int)
                .or_else(|| n.as_u64().map(|u| RecordId::Text(u.to_string()))),
            JsonValue::String(s) => Some(RecordId::Text(s.clone())),
            _ => None,
        }
    }

    /// Parse an identifier given on a command line or query string.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<i64>() {
            Ok(n) => RecordId::Int(n),
            Err(_) => RecordId::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Int(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Text(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId::Text(value)
    }
}

/// One search request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    term: Option<String>,
    kind: String,
    scope: Option<RecordId>,
}

impl SearchRequest {
    pub fn new(kind: impl Into<String>, term: Option<&str>) -> Self {
        Self {
            term: term.map(str::to_string),
            kind: kind.into(),
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<RecordId>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn scope(&self) -> Option<&RecordId> {
        self.scope.as_ref()
    }
}

/// Identifier and relevance score from the ranked-search statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedHit {
    pub id: RecordId,
    pub score: f64,
}

/// Ordered records produced by a search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    /// Records in rank order, or store-default order for a listing
    pub records: Vec<Record>,
    /// False when the term sanitized to nothing and every record was listed
    pub ranked: bool,
}

impl SearchResult {
    pub fn ranked(records: Vec<Record>) -> Self {
        Self {
            records,
            ranked: true,
        }
    }

    pub fn listing(records: Vec<Record>) -> Self {
        Self {
            records,
            ranked: false,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Convert the untyped rows into caller-defined record types, keeping order.
    pub fn deserialize_records<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.records
            .iter()
            .map(|record| Ok(serde_json::from_value(JsonValue::Object(record.clone()))?))
            .collect()
    }
}
