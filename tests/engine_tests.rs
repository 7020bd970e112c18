//! End-to-end engine runs against an in-memory portal

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use rstest::rstest;

use fpds_award_scraper_lib::domain::{FieldMapping, FieldValue};
use fpds_award_scraper_lib::infrastructure::config::{
    EngineSettings, FetchFailurePolicy, SearchConfig, WorkerConfig,
};
use fpds_award_scraper_lib::infrastructure::{
    AwardCrawlingEngine, PageFetcher, RawResponse, ScrapeError, ScrapeResult,
};

const SEARCH: &str = "https://portal.test/ezsearch/fpdsportal";

/// Serves fixed pages by URL; anything else fails as if retries ran out.
#[derive(Default)]
struct FakePortal {
    pages: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl FakePortal {
    fn new() -> Self {
        Self::default().page(SEARCH, r#"<form name="search_awardfull"></form>"#)
    }

    fn page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    /// Listing pages for `query`: the first page and one per offset.
    fn listing(self, query: &str, page_size: u32, total: u32, pages: &[&[&str]]) -> Self {
        let first = format!("{SEARCH}?q={query}");
        let mut portal = self.page(&first, &listing_html(page_size, total, &[]));
        for (index, links) in pages.iter().enumerate() {
            let offset = index as u32 * page_size;
            portal = portal.page(
                &format!("{first}&start={offset}"),
                &listing_html(page_size, total, links),
            );
        }
        portal
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakePortal {
    async fn fetch(&self, url: &str) -> ScrapeResult<RawResponse> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .map(|body| RawResponse::new(url, 200, body.as_str()))
            .ok_or_else(|| ScrapeError::fetch_exhausted(url, 3, "connection refused"))
    }
}

fn listing_html(page_size: u32, total: u32, links: &[&str]) -> String {
    let rows: String = links
        .iter()
        .map(|path| {
            format!(r#"<tr><td><a title="View" href="javascript:getParentURL('{path}')">View</a></td></tr>"#)
        })
        .collect();
    format!(
        r#"<html><body><span class="results_heading">Results</span>
        <b>1</b> - <b>{page_size}</b> of <b>{total}</b><table>{rows}</table></body></html>"#
    )
}

fn award_html(vendor: &str, amount: &str) -> String {
    format!(
        r#"<html><body><table>
        <tr><td id="vendorName">{vendor}</td></tr>
        <tr><td><input id="obligatedAmount" value="{amount}"></td></tr>
        </table></body></html>"#
    )
}

fn mapping() -> FieldMapping {
    FieldMapping::from_json_str(r#"{"Vendor": "vendorName", "Amount": "obligatedAmount"}"#).unwrap()
}

fn settings(pool: usize, policy: FetchFailurePolicy) -> EngineSettings {
    EngineSettings {
        search: SearchConfig {
            search_href: SEARCH.to_string(),
            ..SearchConfig::default()
        },
        workers: WorkerConfig {
            pool,
            batch_multiplier: 5,
        },
        on_fetch_exhausted: policy,
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|name| (*name).to_string()).collect()
}

fn acme_widget_portal() -> FakePortal {
    FakePortal::new()
        .listing("Acme+Corp", 50, 2, &[&["/ezsearch/view?id=empty", "/ezsearch/view?id=good"]])
        .page("https://portal.test/ezsearch/view?id=empty", "<html><body><table><tr><td>n/a</td></tr></table></body></html>")
        .page("https://portal.test/ezsearch/view?id=good", &award_html("ACME CORP", "$10.00"))
        .page(
            &format!("{SEARCH}?q=Widget+LLC"),
            "<html><body><p>No results found</p></body></html>",
        )
}

#[tokio::test]
async fn test_mixed_queries_give_expected_status_and_rows() {
    let portal = Arc::new(acme_widget_portal());
    let engine =
        AwardCrawlingEngine::new(portal.clone(), settings(4, FetchFailurePolicy::AbortRun), mapping())
            .unwrap();
    let queries = names(&["Acme Corp", "", "Widget LLC"]);

    let outcome = engine.run(&queries).await.unwrap();

    assert_eq!(outcome.status.as_slice(), &[true, false, false]);
    assert_eq!(outcome.table.columns, vec!["Vendor", "Amount"]);
    assert_eq!(outcome.table.len(), 1);
    assert_eq!(
        outcome.table.rows[0].values,
        vec![
            Some(FieldValue::Text("ACME CORP".to_string())),
            Some(FieldValue::Text("$10.00".to_string())),
        ]
    );
    assert_eq!(outcome.non_processed(&queries), vec!["", "Widget LLC"]);

    // the blank name never reaches the portal
    assert!(portal.requested().iter().all(|url| !url.ends_with("?q=")));
}

#[tokio::test]
async fn test_links_without_records_downgrade_status() {
    let portal = FakePortal::new()
        .listing("Empty+Co", 50, 1, &[&["/ezsearch/view?id=blank"]])
        .page("https://portal.test/ezsearch/view?id=blank", "<html><body></body></html>");
    let engine = AwardCrawlingEngine::new(
        Arc::new(portal),
        settings(2, FetchFailurePolicy::AbortRun),
        mapping(),
    )
    .unwrap();

    let outcome = engine.run(&names(&["Empty Co"])).await.unwrap();
    assert_eq!(outcome.status.as_slice(), &[false]);
    assert!(outcome.table.is_empty());
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(8)]
#[tokio::test]
async fn test_status_is_indexed_like_input(#[case] pool: usize) {
    // 23 names over batches of pool * 5; every third one has a record
    let mut portal = FakePortal::new();
    let mut queries = Vec::new();
    for i in 0..23 {
        let name = format!("Vendor{i}");
        if i % 3 == 0 {
            let detail = format!("/ezsearch/view?id={i}");
            portal = portal
                .listing(&name, 10, 1, &[&[detail.as_str()]])
                .page(&format!("https://portal.test{detail}"), &award_html(&name, "1"));
        } else {
            portal = portal.page(&format!("{SEARCH}?q={name}"), "<html></html>");
        }
        queries.push(name);
    }

    let engine = AwardCrawlingEngine::new(
        Arc::new(portal),
        settings(pool, FetchFailurePolicy::AbortRun),
        mapping(),
    )
    .unwrap();
    let outcome = engine.run(&queries).await.unwrap();

    let expected: Vec<bool> = (0..23).map(|i| i % 3 == 0).collect();
    assert_eq!(outcome.status.as_slice(), expected.as_slice());
    assert_eq!(outcome.table.len(), 8);
}

#[tokio::test]
async fn test_pagination_fetches_each_offset_once() {
    let portal = Arc::new(
        FakePortal::new()
            .listing(
                "Big+Vendor",
                50,
                120,
                &[&["/ezsearch/view?id=1"], &["/ezsearch/view?id=2"], &["/ezsearch/view?id=3"]],
            )
            .listing("Small+Vendor", 50, 30, &[&["/ezsearch/view?id=4"]])
            .listing("No+Vendor", 50, 0, &[])
            .page("https://portal.test/ezsearch/view?id=1", &award_html("BIG", "1"))
            .page("https://portal.test/ezsearch/view?id=2", &award_html("BIG", "2"))
            .page("https://portal.test/ezsearch/view?id=3", &award_html("BIG", "3"))
            .page("https://portal.test/ezsearch/view?id=4", &award_html("SMALL", "4")),
    );
    let engine =
        AwardCrawlingEngine::new(portal.clone(), settings(1, FetchFailurePolicy::AbortRun), mapping())
            .unwrap();

    let outcome = engine
        .run(&names(&["Big Vendor", "Small Vendor", "No Vendor"]))
        .await
        .unwrap();
    assert_eq!(outcome.status.as_slice(), &[true, true, false]);
    assert_eq!(outcome.table.len(), 4);

    let offsets = |query: &str| {
        let prefix = format!("{SEARCH}?q={query}&start=");
        portal
            .requested()
            .iter()
            .filter_map(|url| url.strip_prefix(&prefix).map(str::to_string))
            .collect::<Vec<_>>()
    };
    assert_eq!(offsets("Big+Vendor"), vec!["0", "50", "100"]);
    assert_eq!(offsets("Small+Vendor"), vec!["0"]);
    assert!(offsets("No+Vendor").is_empty());
}

#[tokio::test]
async fn test_missing_search_form_aborts_before_searching() {
    let portal = Arc::new(
        FakePortal::default().page(SEARCH, "<html><body>Scheduled maintenance</body></html>"),
    );
    let engine =
        AwardCrawlingEngine::new(portal.clone(), settings(2, FetchFailurePolicy::AbortRun), mapping())
            .unwrap();

    let result = engine.run(&names(&["Acme Corp"])).await;
    assert!(matches!(result, Err(ScrapeError::InvalidSearchForm { .. })));
    assert_eq!(portal.requested(), vec![SEARCH.to_string()]);
}

#[tokio::test]
async fn test_exhausted_detail_fetch_aborts_by_default() {
    // the second detail page is not served
    let portal = FakePortal::new()
        .listing("Acme+Corp", 50, 2, &[&["/ezsearch/view?id=a", "/ezsearch/view?id=b"]])
        .page("https://portal.test/ezsearch/view?id=a", &award_html("ACME", "1"));
    let engine = AwardCrawlingEngine::new(
        Arc::new(portal),
        settings(2, FetchFailurePolicy::AbortRun),
        mapping(),
    )
    .unwrap();

    match engine.run(&names(&["Acme Corp"])).await {
        Err(ScrapeError::FetchExhausted { url, .. }) => {
            assert_eq!(url, "https://portal.test/ezsearch/view?id=b");
        }
        other => panic!("expected FetchExhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn test_skip_item_policy_degrades_exhausted_fetches() {
    // "Ghost Inc" search page and one Acme detail page are unreachable
    let portal = FakePortal::new()
        .listing("Acme+Corp", 50, 2, &[&["/ezsearch/view?id=a", "/ezsearch/view?id=b"]])
        .page("https://portal.test/ezsearch/view?id=a", &award_html("ACME", "1"))
        .listing("Lost+LLC", 50, 1, &[&["/ezsearch/view?id=lost"]]);
    let engine = AwardCrawlingEngine::new(
        Arc::new(portal),
        settings(2, FetchFailurePolicy::SkipItem),
        mapping(),
    )
    .unwrap();

    let outcome = engine
        .run(&names(&["Acme Corp", "Ghost Inc", "Lost LLC"]))
        .await
        .unwrap();
    assert_eq!(outcome.status.as_slice(), &[true, false, false]);
    assert_eq!(outcome.table.len(), 1);
}

#[tokio::test]
async fn test_empty_name_list_touches_nothing() {
    let portal = Arc::new(FakePortal::new());
    let engine =
        AwardCrawlingEngine::new(portal.clone(), settings(4, FetchFailurePolicy::AbortRun), mapping())
            .unwrap();

    let outcome = engine.run(&[]).await.unwrap();
    assert!(outcome.status.is_empty());
    assert!(outcome.table.is_empty());
    assert!(portal.requested().is_empty());
}
