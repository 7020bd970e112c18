//! HTML parsing for the FPDS portal
//!
//! Search result listings (summary counts, detail links, search form marker)
//! and award detail forms (mapped field values).

pub mod award_form_parser;
pub mod error;
pub mod search_results_parser;

pub use award_form_parser::{AwardFormParser, FieldSource};
pub use error::{ParsingError, ParsingResult};
pub use search_results_parser::SearchResultsParser;

use scraper::Selector;

/// Compile a selector, reporting the offending selector text on failure
pub(crate) fn compile_selector(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector).map_err(|e| ParsingError::invalid_selector(selector, e))
}
