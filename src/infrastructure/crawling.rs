//! The three fetch-and-parse stages of a run
//!
//! `SiteValidator` checks the search page before any query is issued.
//! `SearchPaginator` turns a search name into the set of detail links across
//! every result page. `FormExtractor` turns one detail link into a record.

use std::collections::BTreeSet;
use std::sync::Arc;

use scraper::Html;
use tracing::{debug, info, warn};
use url::{Url, form_urlencoded};

use crate::domain::aggregation::ExtractionOutcome;
use crate::domain::mapping::FieldMapping;
use crate::domain::record::DetailLink;
use crate::infrastructure::config::SearchConfig;
use crate::infrastructure::errors::{ScrapeError, ScrapeResult};
use crate::infrastructure::http_client::PageFetcher;
use crate::infrastructure::parsing::{AwardFormParser, SearchResultsParser};

/// Checks that the search endpoint still serves the expected form
#[derive(Clone)]
pub struct SiteValidator {
    fetcher: Arc<dyn PageFetcher>,
    config: SearchConfig,
    parser: Arc<SearchResultsParser>,
}

impl SiteValidator {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: SearchConfig) -> ScrapeResult<Self> {
        let parser = SearchResultsParser::new(&config)?;
        Ok(Self {
            fetcher,
            config,
            parser: Arc::new(parser),
        })
    }

    pub async fn validate(&self) -> ScrapeResult<()> {
        let response = self.fetcher.fetch(&self.config.search_href).await?;
        let html = Html::parse_document(&response.body);

        if !self.parser.has_search_form(&html) {
            return Err(ScrapeError::InvalidSearchForm {
                url: self.config.search_href.clone(),
                form_name: self.config.search_form_name.clone(),
            });
        }

        info!("Search page validated: {}", self.config.search_href);
        Ok(())
    }
}

/// Collects detail links for one search name across all result pages
#[derive(Clone)]
pub struct SearchPaginator {
    fetcher: Arc<dyn PageFetcher>,
    config: SearchConfig,
    parser: Arc<SearchResultsParser>,
}

impl SearchPaginator {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: SearchConfig) -> ScrapeResult<Self> {
        let parser = SearchResultsParser::new(&config)?;
        Ok(Self {
            fetcher,
            config,
            parser: Arc::new(parser),
        })
    }

    /// `{search_href}?q={name}` with the name form-encoded
    pub fn first_page_url(&self, query: &str) -> String {
        let encoded: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("q", query)
            .finish();
        format!("{}?{}", self.config.search_href, encoded)
    }

    /// Every distinct detail link the search name leads to.
    ///
    /// Blank names and listings without a readable summary yield an empty set.
    /// A result page without a readable summary contributes no links.
    pub async fn paginate(&self, query: &str) -> ScrapeResult<BTreeSet<String>> {
        let mut links = BTreeSet::new();
        if query.trim().is_empty() {
            debug!("Skipping blank search name");
            return Ok(links);
        }

        let first_url = self.first_page_url(query);
        let first_page = self.fetcher.fetch(&first_url).await?;

        let summary = {
            let html = Html::parse_document(&first_page.body);
            match self.parser.parse_summary(&html) {
                Ok(summary) => summary,
                Err(e) => {
                    debug!("No results for '{}': {}", query, e);
                    return Ok(links);
                }
            }
        };

        let offsets = summary.offsets();
        debug!(
            "'{}': {} results over {} pages",
            query,
            summary.total,
            offsets.len()
        );

        for offset in offsets {
            let page_url = format!("{first_url}&start={offset}");
            let page = self.fetcher.fetch(&page_url).await?;
            let base = Url::parse(&page.url)
                .or_else(|_| Url::parse(&page_url))
                .map_err(|e| ScrapeError::invalid_url(&page_url, e))?;

            let html = Html::parse_document(&page.body);
            if let Err(e) = self.parser.parse_summary(&html) {
                debug!("Result page {} has no readable summary, skipped: {}", page_url, e);
                continue;
            }
            let found = self.parser.extract_view_links(&html, &base);
            if found.is_empty() {
                warn!("Result page {} carried no view links", page_url);
            }
            links.extend(found);
        }

        Ok(links)
    }
}

/// Extracts a record from one award detail page
#[derive(Clone)]
pub struct FormExtractor {
    fetcher: Arc<dyn PageFetcher>,
    mapping: Arc<FieldMapping>,
    parser: Arc<AwardFormParser>,
}

impl FormExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, mapping: Arc<FieldMapping>) -> ScrapeResult<Self> {
        let parser = AwardFormParser::new()?;
        Ok(Self {
            fetcher,
            mapping,
            parser: Arc::new(parser),
        })
    }

    pub async fn extract(&self, link: DetailLink) -> ScrapeResult<ExtractionOutcome> {
        let page = self.fetcher.fetch(&link.url).await?;
        let record = self.parser.parse_document(&page.body, &self.mapping);
        if record.is_none() {
            debug!("No usable fields on {}", link);
        }
        Ok(ExtractionOutcome::new(link.query_index, record))
    }
}
