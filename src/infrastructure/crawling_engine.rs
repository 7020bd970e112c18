//! Award scraping engine
//!
//! One run goes through three stages:
//! 1. validate the search page
//! 2. search every name (batched) and collect its detail links
//! 3. extract every detail link (batched) and reconcile into the outcome

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::{Instrument, Span, info, info_span, warn};

use crate::domain::aggregation::{ExtractionOutcome, ResultAggregator};
use crate::domain::mapping::FieldMapping;
use crate::domain::record::{DetailLink, ResultTable, StatusVector};
use crate::infrastructure::batch_scheduler::run_batched;
use crate::infrastructure::config::{EngineSettings, FetchFailurePolicy};
use crate::infrastructure::crawling::{FormExtractor, SearchPaginator, SiteValidator};
use crate::infrastructure::errors::ScrapeResult;
use crate::infrastructure::http_client::PageFetcher;

/// Result of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeOutcome {
    pub status: StatusVector,
    pub table: ResultTable,
}

impl ScrapeOutcome {
    /// Names whose query produced no usable record, in input order
    pub fn non_processed<'a>(&self, names: &'a [String]) -> Vec<&'a str> {
        names
            .iter()
            .enumerate()
            .filter(|(index, _)| self.status.get(*index) == Some(false))
            .map(|(_, name)| name.as_str())
            .collect()
    }
}

pub struct AwardCrawlingEngine {
    settings: EngineSettings,
    mapping: Arc<FieldMapping>,
    validator: SiteValidator,
    paginator: SearchPaginator,
    extractor: FormExtractor,
}

impl AwardCrawlingEngine {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        settings: EngineSettings,
        mapping: FieldMapping,
    ) -> ScrapeResult<Self> {
        let mapping = Arc::new(mapping);
        Ok(Self {
            validator: SiteValidator::new(Arc::clone(&fetcher), settings.search.clone())?,
            paginator: SearchPaginator::new(Arc::clone(&fetcher), settings.search.clone())?,
            extractor: FormExtractor::new(fetcher, Arc::clone(&mapping))?,
            settings,
            mapping,
        })
    }

    /// Scrape every name; the status vector is indexed like `names`.
    pub async fn run(&self, names: &[String]) -> ScrapeResult<ScrapeOutcome> {
        let span = info_span!("scrape_run", queries = names.len());
        self.run_stages(names).instrument(span).await
    }

    async fn run_stages(&self, names: &[String]) -> ScrapeResult<ScrapeOutcome> {
        let started = Instant::now();
        if names.is_empty() {
            info!("No search names, nothing to do");
            return Ok(ScrapeOutcome {
                status: StatusVector::default(),
                table: ResultTable::new(self.mapping.columns()),
            });
        }

        self.validator
            .validate()
            .instrument(info_span!("validate"))
            .await?;

        let link_sets = self
            .search_all(names.to_vec())
            .instrument(info_span!("search"))
            .await?;
        let status = ResultAggregator::initial_status(&link_sets);
        let links = ResultAggregator::flatten_links(link_sets);
        info!(
            "Search done: {} links for {} names",
            links.len(),
            names.len()
        );

        let outcomes = self
            .extract_all(links)
            .instrument(info_span!("extract"))
            .await?;
        let (status, table) = ResultAggregator::reconcile(status, outcomes, self.mapping.columns());

        info!(
            "Run finished in {:?}: {} records, {} of {} names not processed",
            started.elapsed(),
            table.len(),
            status.as_slice().iter().filter(|flag| !**flag).count(),
            status.len()
        );
        Ok(ScrapeOutcome { status, table })
    }

    async fn search_all(&self, names: Vec<String>) -> ScrapeResult<Vec<BTreeSet<String>>> {
        let skip = self.skips_exhausted_fetches();
        run_batched(
            names,
            self.settings.workers.pool,
            self.settings.workers.batch_multiplier,
            |name| {
                let paginator = self.paginator.clone();
                async move {
                    match paginator.paginate(&name).await {
                        Err(e) if skip && e.is_fetch_exhausted() => {
                            warn!("Search for '{}' skipped: {}", name, e);
                            Ok(BTreeSet::new())
                        }
                        result => result,
                    }
                }
                .instrument(Span::current())
            },
        )
        .await
    }

    async fn extract_all(&self, links: Vec<DetailLink>) -> ScrapeResult<Vec<ExtractionOutcome>> {
        let skip = self.skips_exhausted_fetches();
        run_batched(
            links,
            self.settings.workers.pool,
            self.settings.workers.batch_multiplier,
            |link| {
                let extractor = self.extractor.clone();
                let query_index = link.query_index;
                async move {
                    match extractor.extract(link).await {
                        Err(e) if skip && e.is_fetch_exhausted() => {
                            warn!("Detail page skipped: {}", e);
                            Ok(ExtractionOutcome::new(query_index, None))
                        }
                        result => result,
                    }
                }
                .instrument(Span::current())
            },
        )
        .await
    }

    fn skips_exhausted_fetches(&self) -> bool {
        self.settings.on_fetch_exhausted == FetchFailurePolicy::SkipItem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_processed_lists_false_names() {
        let outcome = ScrapeOutcome {
            status: StatusVector::new(vec![true, false, false]),
            table: ResultTable::default(),
        };
        let names = vec![
            "Acme Corp".to_string(),
            String::new(),
            "Widget LLC".to_string(),
        ];
        assert_eq!(outcome.non_processed(&names), vec!["", "Widget LLC"]);
    }
}
