//! Output column mapping
//!
//! Maps each logical output column to the id of the page element carrying its
//! value on an award detail form. Key order is the output column order.

use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered column name -> element id mapping, loaded once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping(IndexMap<String, String>);

impl FieldMapping {
    /// Parse a mapping from a JSON object, keeping the key order of the document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let map: IndexMap<String, String> =
            serde_json::from_str(json).context("Field mapping must be a JSON object of strings")?;
        Ok(Self(map))
    }

    /// Load the mapping file referenced by `paths.mapping`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read field mapping: {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Invalid field mapping: {}", path.display()))
    }

    /// Output column names in mapping order
    pub fn columns(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    /// Element ids in mapping order (may repeat)
    pub fn element_ids(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }

    pub fn contains_id(&self, element_id: &str) -> bool {
        self.0.values().any(|id| id == element_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
