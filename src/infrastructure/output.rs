//! Run reports
//!
//! The result table and the per-name status report are written as CSV files
//! into the output directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

use crate::domain::record::{ResultTable, StatusVector};

const PROCESSED: &str = "processed";
const NOT_PROCESSED: &str = "not processed";

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))
}

fn timestamped(dir: &Path, prefix: &str) -> PathBuf {
    dir.join(format!("{}_{}.csv", prefix, Local::now().format("%Y%m%d_%H%M%S")))
}

/// Write the result table; returns `None` without touching disk when it is empty.
pub fn write_result_table(table: &ResultTable, dir: &Path) -> Result<Option<PathBuf>> {
    if table.is_empty() {
        info!("No records extracted, result table not written");
        return Ok(None);
    }

    ensure_dir(dir)?;
    let path = timestamped(dir, "FPDS_results");
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create result file: {}", path.display()))?;

    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(
            row.values
                .iter()
                .map(|value| value.as_ref().map(ToString::to_string).unwrap_or_default()),
        )?;
    }
    writer.flush()?;

    info!("Wrote {} records to {}", table.len(), path.display());
    Ok(Some(path))
}

/// Write `name,status` for every input name.
pub fn write_status_report(names: &[String], status: &StatusVector, dir: &Path) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let path = timestamped(dir, "FPDS_status");
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create status file: {}", path.display()))?;

    writer.write_record(["name", "status"])?;
    for (index, name) in names.iter().enumerate() {
        let label = if status.get(index).unwrap_or(false) {
            PROCESSED
        } else {
            NOT_PROCESSED
        };
        writer.write_record([name.as_str(), label])?;
    }
    writer.flush()?;

    info!("Wrote status report to {}", path.display());
    Ok(path)
}
