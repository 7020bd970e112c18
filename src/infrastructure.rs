//! Infrastructure layer for portal access, parsing, scheduling and file I/O
//!
//! Everything that touches the network, the file system or the process
//! environment lives here; the domain module stays pure.

pub mod batch_scheduler; // Bounded batches over a semaphore
pub mod config; // Layered configuration
pub mod crawling; // Validate / search / extract stages
pub mod crawling_engine; // Full run orchestration
pub mod errors; // Boundary error types
pub mod http_client; // Retrying page fetcher
pub mod input; // Search name input
pub mod logging; // Logging infrastructure
pub mod output; // Status report and result table
pub mod parsing; // Listing and award form parsers
pub mod workspace; // Temp directory cleanup

// Re-export commonly used items
pub use config::{AppConfig, ConfigError, EngineSettings, FetchFailurePolicy};
pub use crawling::{FormExtractor, SearchPaginator, SiteValidator};
pub use crawling_engine::{AwardCrawlingEngine, ScrapeOutcome};
pub use errors::{ScrapeError, ScrapeResult};
pub use http_client::{HttpClient, PageFetcher, RawResponse, RetryPolicy};
pub use logging::{LogGuard, init_logging, init_logging_with_config};
pub use parsing::{AwardFormParser, ParsingError, ParsingResult, SearchResultsParser};
