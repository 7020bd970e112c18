//! Extracted award records, detail links and per-query status

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single extracted field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text of a cell, input value, textarea or selected option
    Text(String),
    /// Checked state of a checkbox-like input without a value
    Flag(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

/// One row of the result table; values follow the field mapping order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub values: Vec<Option<FieldValue>>,
}

impl FieldRecord {
    /// Build a record, returning `None` when every value is absent.
    pub fn from_values(values: Vec<Option<FieldValue>>) -> Option<Self> {
        if values.iter().all(Option::is_none) {
            None
        } else {
            Some(Self { values })
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Absolute detail page URL tagged with the query that produced it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DetailLink {
    /// Position of the originating query in the input list
    pub query_index: usize,
    pub url: String,
}

impl DetailLink {
    pub fn new(query_index: usize, url: String) -> Self {
        Self { query_index, url }
    }
}

impl AsRef<str> for DetailLink {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for DetailLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (query: {})", self.url, self.query_index)
    }
}

/// `true` at index i when query i produced at least one usable record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusVector(Vec<bool>);

impl StatusVector {
    pub fn new(flags: Vec<bool>) -> Self {
        Self(flags)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, query_index: usize) -> Option<bool> {
        self.0.get(query_index).copied()
    }

    /// Mark a query as not processed. Out-of-range indices are ignored.
    pub fn downgrade(&mut self, query_index: usize) {
        if let Some(flag) = self.0.get_mut(query_index) {
            *flag = false;
        }
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    pub fn has_non_processed(&self) -> bool {
        self.0.iter().any(|flag| !flag)
    }
}

/// All usable records of a run, headed by the mapping's column names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<FieldRecord>,
}

impl ResultTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, record: FieldRecord) {
        self.rows.push(record);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}
