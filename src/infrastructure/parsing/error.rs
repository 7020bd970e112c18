//! Parsing error types
//!
//! None of these abort a run: an unreadable results summary means the query
//! found nothing, an invalid selector is reported when a parser is built.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("Results summary '{heading_class}' not found")]
    SummaryMissing { heading_class: String },

    #[error("Results summary is malformed: {reason}")]
    SummaryMalformed { reason: String },

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },
}

impl ParsingError {
    pub fn summary_malformed(reason: impl Into<String>) -> Self {
        Self::SummaryMalformed {
            reason: reason.into(),
        }
    }

    /// `reason` is rendered with `Debug`; scraper's `Display` for selector
    /// errors panics on some tokens.
    pub fn invalid_selector(selector: &str, reason: impl std::fmt::Debug) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: format!("{reason:?}"),
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
