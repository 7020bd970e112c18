//! FPDS award scraper command line entry point

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use fpds_award_scraper_lib::infrastructure::{AppConfig, HttpClient, init_logging_with_config};

#[derive(Parser, Debug)]
#[command(name = "fpds-award-scraper", version, about = "Scrape FPDS award forms for a list of names")]
struct Cli {
    /// Configuration file (TOML, JSON or YAML)
    #[arg(long, default_value = "settings/config.toml")]
    config: PathBuf,

    /// CSV file whose first column holds the search names
    #[arg(long)]
    input: PathBuf,

    /// Overrides `paths.output_dir`
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match AppConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config is not usable ({}): {e}", cli.config.display());
            return ExitCode::FAILURE;
        }
    };
    if let Some(dir) = cli.output_dir {
        config.paths.output_dir = dir;
    }

    let _log_guard = match init_logging_with_config(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    info!("FPDS bot execution started");
    let result = async {
        let client = HttpClient::new(&config.http).context("Failed to build HTTP client")?;
        fpds_award_scraper_lib::run(&config, &cli.input, Arc::new(client)).await
    }
    .await;

    let code = match result {
        Ok(report) => {
            info!("Status report: {}", report.status_report.display());
            match &report.result_table {
                Some(path) => info!("Result table: {}", path.display()),
                None => info!("No records extracted"),
            }
            let missing = report.non_processed();
            if !missing.is_empty() {
                info!("Not processed: {}", missing.join(", "));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("FPDS bot execution failed: {:#}", e);
            ExitCode::FAILURE
        }
    };

    info!("FPDS bot execution ended");
    code
}
