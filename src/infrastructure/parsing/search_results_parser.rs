//! Search results listing parser
//!
//! The listing carries a summary span followed by bold numbers
//! ("Results <b>1</b> - <b>30</b> of <b>120</b>"): the second is the page
//! size, the third the total result count. Detail links are "View" anchors
//! whose href wraps the real path in a `getParentURL('...')` script call.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use super::error::{ParsingError, ParsingResult};
use super::compile_selector;
use crate::domain::pagination::ResultsSummary;
use crate::infrastructure::config::SearchConfig;

const SCRIPT_LINK_PREFIX: &str = "javascript:getParentURL('";
const SCRIPT_LINK_SUFFIX: &str = "')";

/// Parser for search pages and result listings
///
/// Selectors are fixed; the configured form name, heading class and link
/// title are matched against element attributes.
pub struct SearchResultsParser {
    form_name: String,
    heading_class: String,
    view_link_title: String,
    form_selector: Selector,
    summary_selector: Selector,
    titled_link_selector: Selector,
}

impl SearchResultsParser {
    pub fn new(config: &SearchConfig) -> ParsingResult<Self> {
        Ok(Self {
            form_name: config.search_form_name.clone(),
            heading_class: config.results_heading_class.clone(),
            view_link_title: config.view_link_title.clone(),
            form_selector: compile_selector("form[name]")?,
            summary_selector: compile_selector("span, b")?,
            titled_link_selector: compile_selector("[title][href]")?,
        })
    }

    /// Whether the page carries the search form
    pub fn has_search_form(&self, html: &Html) -> bool {
        html.select(&self.form_selector)
            .any(|form| form.value().attr("name") == Some(self.form_name.as_str()))
    }

    fn is_heading(&self, element: &ElementRef) -> bool {
        let element = element.value();
        element.name() == "span" && element.classes().any(|class| class == self.heading_class)
    }

    /// Read page size and total count from the results summary.
    ///
    /// Uses the bold elements at or after the first summary span, in document
    /// order.
    pub fn parse_summary(&self, html: &Html) -> ParsingResult<ResultsSummary> {
        let mut heading_found = false;
        let mut numbers = Vec::with_capacity(3);

        for element in html.select(&self.summary_selector) {
            if !heading_found {
                heading_found = self.is_heading(&element);
                continue;
            }
            if element.value().name() == "b" {
                numbers.push(element.text().collect::<String>());
                if numbers.len() == 3 {
                    break;
                }
            }
        }

        if !heading_found {
            return Err(ParsingError::SummaryMissing {
                heading_class: self.heading_class.clone(),
            });
        }

        if numbers.len() < 3 {
            return Err(ParsingError::summary_malformed(format!(
                "expected 3 bold numbers after the heading, found {}",
                numbers.len()
            )));
        }

        let page_size = parse_count(&numbers[1])?;
        let total = parse_count(&numbers[2])?;
        debug!("Results summary: page size {}, total {}", page_size, total);
        Ok(ResultsSummary::new(page_size, total))
    }

    /// Detail page URLs of every "View" anchor, resolved against `base`.
    pub fn extract_view_links(&self, html: &Html, base: &Url) -> Vec<String> {
        html.select(&self.titled_link_selector)
            .filter(|anchor| anchor.value().attr("title") == Some(self.view_link_title.as_str()))
            .filter_map(|anchor| anchor.value().attr("href"))
            .filter_map(|href| {
                let path = unwrap_script_link(href);
                match base.join(&path) {
                    Ok(url) => Some(url.to_string()),
                    Err(e) => {
                        warn!("Skipping unresolvable view link '{}': {}", href, e);
                        None
                    }
                }
            })
            .collect()
    }
}

/// Strip the `javascript:getParentURL('...')` wrapper from a view link
fn unwrap_script_link(href: &str) -> String {
    href.replace(SCRIPT_LINK_PREFIX, "")
        .replace(SCRIPT_LINK_SUFFIX, "")
}

fn parse_count(text: &str) -> ParsingResult<u32> {
    let digits: String = text.trim().chars().filter(|c| *c != ',').collect();
    digits
        .parse::<u32>()
        .map_err(|e| ParsingError::summary_malformed(format!("'{}' is not a count: {}", text.trim(), e)))
}
