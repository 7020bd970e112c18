//! Configuration infrastructure
//!
//! Settings for the FPDS search endpoint, fetch retries, worker pool sizing,
//! file locations and logging. Loaded from a config file and overridden by
//! `FPDS__<SECTION>__<KEY>` environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use url::Url;

pub use crate::infrastructure::logging::LoggingConfig;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {message}")]
    Validation { message: String },
}

impl ConfigError {
    fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub http: HttpConfig,
    pub workers: WorkerConfig,
    pub failure: FailureConfig,
    pub paths: PathsConfig,
    pub logging: LoggingConfig,
}

/// Search endpoint and the markup markers the portal is expected to carry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search endpoint; queries are appended as `?q=<name>`
    pub search_href: String,

    /// `name` of the form that must be present on the search page
    pub search_form_name: String,

    /// Class of the span introducing the results summary
    pub results_heading_class: String,

    /// `title` attribute of the anchors linking to detail forms
    pub view_link_title: String,
}

/// Per-fetch retry behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Attempts per GET before giving up
    pub retries_count: u32,

    /// Backoff unit; each failed attempt waits `sleep_seconds * 5` seconds
    pub sleep_seconds: u64,

    pub user_agent: String,

    /// Request timeout; `None` keeps the transport default
    pub timeout_seconds: Option<u64>,
}

/// Worker pool sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Parallel workers per batch
    pub pool: usize,

    /// Batch size is `pool * batch_multiplier`
    pub batch_multiplier: usize,
}

/// What a fetch that ran out of retries does to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchFailurePolicy {
    /// Abort the whole run
    #[default]
    AbortRun,
    /// Treat the affected query or link as yielding nothing
    SkipItem,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FailureConfig {
    pub on_fetch_exhausted: FetchFailurePolicy,
}

/// File locations used by the runner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// JSON object mapping output columns to element ids
    pub mapping: PathBuf,

    /// Scratch directory, removed before and after each run
    pub temp: PathBuf,

    /// Where the status report and result table are written
    pub output_dir: PathBuf,
}

/// The subset of configuration the scraping engine runs with
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub search: SearchConfig,
    pub workers: WorkerConfig,
    pub on_fetch_exhausted: FetchFailurePolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            search_href: defaults::SEARCH_HREF.to_string(),
            search_form_name: defaults::SEARCH_FORM_NAME.to_string(),
            results_heading_class: defaults::RESULTS_HEADING_CLASS.to_string(),
            view_link_title: defaults::VIEW_LINK_TITLE.to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            retries_count: defaults::RETRIES_COUNT,
            sleep_seconds: defaults::SLEEP_SECONDS,
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_seconds: None,
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            pool: defaults::POOL,
            batch_multiplier: defaults::BATCH_MULTIPLIER,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            mapping: PathBuf::from(defaults::MAPPING_PATH),
            temp: PathBuf::from(defaults::TEMP_DIR),
            output_dir: PathBuf::from(defaults::OUTPUT_DIR),
        }
    }
}

impl AppConfig {
    /// Load a config file (format chosen by extension) with environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix(defaults::ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(content, config::FileFormat::Toml))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.retries_count == 0 {
            return Err(ConfigError::validation("http.retries_count must be at least 1"));
        }

        if self.workers.pool == 0 {
            return Err(ConfigError::validation("workers.pool must be at least 1"));
        }

        if self.workers.batch_multiplier == 0 {
            return Err(ConfigError::validation(
                "workers.batch_multiplier must be at least 1",
            ));
        }

        let markers = [
            ("search.search_form_name", &self.search.search_form_name),
            ("search.results_heading_class", &self.search.results_heading_class),
            ("search.view_link_title", &self.search.view_link_title),
        ];
        for (key, value) in markers {
            if value.trim().is_empty() {
                return Err(ConfigError::validation(format!("{key} must not be empty")));
            }
        }
        if self
            .search
            .results_heading_class
            .contains(char::is_whitespace)
        {
            return Err(ConfigError::validation(
                "search.results_heading_class must be a single class name",
            ));
        }

        match Url::parse(&self.search.search_href) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::validation(format!(
                    "search.search_href must be http(s), got scheme '{}'",
                    url.scheme()
                )));
            }
            Err(e) => {
                return Err(ConfigError::validation(format!(
                    "search.search_href is not a valid URL: {e}"
                )));
            }
        }

        Ok(())
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            search: self.search.clone(),
            workers: self.workers.clone(),
            on_fetch_exhausted: self.failure.on_fetch_exhausted,
        }
    }
}

/// Default configuration values
pub mod defaults {
    /// Prefix of environment overrides, e.g. `FPDS__HTTP__RETRIES_COUNT`
    pub const ENV_PREFIX: &str = "FPDS";

    /// Default FPDS ezSearch endpoint
    pub const SEARCH_HREF: &str = "https://www.fpds.gov/ezsearch/fpdsportal";

    pub const SEARCH_FORM_NAME: &str = "search_awardfull";

    pub const RESULTS_HEADING_CLASS: &str = "results_heading";

    pub const VIEW_LINK_TITLE: &str = "View";

    /// Default attempts per GET
    pub const RETRIES_COUNT: u32 = 3;

    /// Default backoff unit in seconds
    pub const SLEEP_SECONDS: u64 = 1;

    /// Multiplier applied to `sleep_seconds` for each retry wait
    pub const BACKOFF_FACTOR: u64 = 5;

    pub const USER_AGENT: &str = "fpds-award-scraper/0.2";

    /// Default worker pool size
    pub const POOL: usize = 4;

    pub const BATCH_MULTIPLIER: usize = 5;

    pub const MAPPING_PATH: &str = "settings/mapping.json";

    pub const TEMP_DIR: &str = "temp";

    pub const OUTPUT_DIR: &str = "output";

    // Log configuration defaults
    pub const LOG_LEVEL: &str = "info";

    pub const LOG_JSON_FORMAT: bool = false;

    pub const LOG_CONSOLE_OUTPUT: bool = true;

    pub const LOG_FILE_OUTPUT: bool = true;

    pub const LOG_DIR: &str = "log";

    pub const LOG_FILE_NAME: &str = "FPDS_bot.log";
}
