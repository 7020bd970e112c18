//! Failures that cross the scraping engine boundary
//!
//! Only these abort a run. Unparseable summaries and empty detail forms are
//! absorbed into the status vector and never surface here.

use thiserror::Error;

use crate::infrastructure::parsing::ParsingError;

#[derive(Error, Debug, Clone)]
pub enum ScrapeError {
    #[error("All {attempts} fetch attempts failed for {url}: {last_error}")]
    FetchExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Search page {url} has no '{form_name}' form")]
    InvalidSearchForm { url: String, form_name: String },

    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Parser setup failed: {0}")]
    ParserSetup(#[from] ParsingError),

    #[error("Worker task failed: {message}")]
    Worker { message: String },
}

impl ScrapeError {
    pub fn fetch_exhausted(url: &str, attempts: u32, last_error: impl ToString) -> Self {
        Self::FetchExhausted {
            url: url.to_string(),
            attempts,
            last_error: last_error.to_string(),
        }
    }

    pub fn invalid_url(url: &str, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn is_fetch_exhausted(&self) -> bool {
        matches!(self, Self::FetchExhausted { .. })
    }
}

impl From<tokio::task::JoinError> for ScrapeError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Worker {
            message: err.to_string(),
        }
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
