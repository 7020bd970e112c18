//! Application layer: one complete bot run
//!
//! Wires configuration, the field mapping, the input names and the scraping
//! engine together and writes the run reports.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{error, info, warn};

use crate::domain::mapping::FieldMapping;
use crate::domain::record::{ResultTable, StatusVector};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::crawling_engine::{AwardCrawlingEngine, ScrapeOutcome};
use crate::infrastructure::http_client::PageFetcher;
use crate::infrastructure::{input, output, workspace};

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub names: Vec<String>,
    pub outcome: ScrapeOutcome,
    pub status_report: PathBuf,
    /// `None` when no record was extracted
    pub result_table: Option<PathBuf>,
}

impl RunReport {
    pub fn non_processed(&self) -> Vec<&str> {
        self.outcome.non_processed(&self.names)
    }
}

fn load_mapping(path: &Path) -> Result<FieldMapping> {
    if !path.exists() {
        bail!("Output columns mapping not found: {}", path.display());
    }
    let mapping = FieldMapping::load(path)?;
    if mapping.is_empty() {
        warn!("Field mapping {} has no columns", path.display());
    }
    Ok(mapping)
}

/// Run the bot over the names in `input_path`.
///
/// The temp directory is cleaned before the run and again afterwards, whether
/// the run succeeded or not.
pub async fn run(
    config: &AppConfig,
    input_path: &Path,
    fetcher: Arc<dyn PageFetcher>,
) -> Result<RunReport> {
    let mapping = load_mapping(&config.paths.mapping)?;
    info!(
        "Loaded {} output columns from {}",
        mapping.len(),
        config.paths.mapping.display()
    );

    workspace::clean_temp_dir(&config.paths.temp);
    let result = run_inner(config, input_path, fetcher, mapping).await;
    workspace::clean_temp_dir(&config.paths.temp);

    if let Err(e) = &result {
        error!("Run failed: {:#}", e);
    }
    result
}

async fn run_inner(
    config: &AppConfig,
    input_path: &Path,
    fetcher: Arc<dyn PageFetcher>,
    mapping: FieldMapping,
) -> Result<RunReport> {
    let names = input::read_search_names(input_path)?;

    let outcome = if names.is_empty() {
        info!("Input has no search names, skipping the portal");
        ScrapeOutcome {
            status: StatusVector::default(),
            table: ResultTable::new(mapping.columns()),
        }
    } else {
        info!("Scraping {} search names", names.len());
        let engine = AwardCrawlingEngine::new(fetcher, config.engine_settings(), mapping)?;
        engine
            .run(&names)
            .await
            .context("FPDS portal scraping failed")?
    };

    let status_report =
        output::write_status_report(&names, &outcome.status, &config.paths.output_dir)?;
    let result_table = output::write_result_table(&outcome.table, &config.paths.output_dir)?;

    Ok(RunReport {
        names,
        outcome,
        status_report,
        result_table,
    })
}
