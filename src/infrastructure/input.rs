//! Search name input
//!
//! Names come from the first column of a CSV file with a header row. Blank
//! cells stay in the list as empty queries so that status indices line up
//! with input rows.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

pub fn read_search_names(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;

    let mut names = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record
            .with_context(|| format!("Malformed input row {} in {}", row + 2, path.display()))?;
        names.push(record.get(0).unwrap_or_default().trim().to_string());
    }

    info!("Read {} search names from {}", names.len(), path.display());
    Ok(names)
}
