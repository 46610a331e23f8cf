//! End-to-end crawls against canned fetchers.

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::config::{CrawlRequest, CrawlerConfig, FetchConfig};
use crate::core::SourceId;
use crate::errors::FetchError;
use crate::events::CollectingEventSink;
use crate::fetch::{FetchedPage, Fetcher, MockFetcher, RenderMode, RetryConfig};
use crate::output::CollectingRecordSink;
use crate::pagination::TerminationReason;
use crate::testing::{hellowork_listing, wttj_listing, DetailPage, ListingCard, StaticFetcher};

use super::{Crawler, CrawlerBuilder};

const JOB: &str = "data analyst";
const PLACE: &str = "paris";

fn config() -> CrawlerConfig {
    CrawlerConfig::new().with_retry(RetryConfig::disabled())
}

fn crawler(fetcher: Arc<dyn Fetcher>) -> Crawler {
    CrawlerBuilder::new()
        .with_config(config())
        .with_fetcher(fetcher)
        .build()
        .unwrap()
}

fn request(sources: &[SourceId], max_pages: u32) -> CrawlRequest {
    CrawlRequest::new(JOB, PLACE)
        .with_max_pages(max_pages)
        .with_sources(sources.iter().copied())
}

/// Listing and detail URLs of a built-in source, resolved the way a crawl does.
struct Urls {
    first: Url,
}

impl Urls {
    fn of(id: SourceId) -> Self {
        let registry = crate::sources::SourceRegistry::builtin().unwrap();
        let first = registry.get(id).unwrap().first_page_url(JOB, PLACE).unwrap();
        Self { first }
    }

    fn page(id: SourceId, page: u32) -> Url {
        let registry = crate::sources::SourceRegistry::builtin().unwrap();
        registry.get(id).unwrap().page_url(JOB, PLACE, page).unwrap()
    }

    fn detail(&self, href: &str) -> Url {
        self.first.join(href).unwrap()
    }
}

fn hw_card(n: u32) -> ListingCard {
    ListingCard::new(format!("Data Analyst {n} - Acme"), format!("/fr-fr/emplois/{n}.html"))
        .with_id(n.to_string())
}

fn detail_body(summary: &str) -> String {
    DetailPage::new()
        .with_summary(summary)
        .with_qualifications(&["SQL"])
        .with_section("Les missions", &["Analyser"])
        .with_section("Le profil", &["Bac+5"])
        .render()
}

/// A HelloWork listing page whose cards all have detail pages.
fn hellowork_page(fetcher: StaticFetcher, url: &Url, cards: &[u32]) -> StaticFetcher {
    let urls = Urls::of(SourceId::HelloWork);
    let listing: Vec<ListingCard> = cards.iter().map(|n| hw_card(*n)).collect();
    let mut fetcher = fetcher.with_page(url.as_str(), hellowork_listing(&listing));
    for n in cards {
        let detail = urls.detail(&format!("/fr-fr/emplois/{n}.html"));
        fetcher = fetcher.with_page(detail.as_str(), detail_body(&format!("Offer {n}")));
    }
    fetcher
}

#[tokio::test]
async fn test_failures_are_isolated_per_source() {
    let hw = Urls::of(SourceId::HelloWork);
    let wttj = Urls::of(SourceId::WelcomeToTheJungle);

    let wttj_cards = [
        ListingCard::new("Analyste", "/fr/companies/a/jobs/1").with_company("A"),
        ListingCard::new("Analyste", "/fr/companies/b/jobs/2").with_company("B"),
    ];
    let broken = |href: &str| FetchError::Status {
        status: 500,
        url: wttj.detail(href).to_string(),
    };
    let fetcher = hellowork_page(StaticFetcher::new(), &hw.first, &[1, 2, 3, 4, 5])
        .with_page(wttj.first.as_str(), wttj_listing(&wttj_cards, None))
        .with_failure(wttj.detail("/fr/companies/a/jobs/1").as_str(), broken("/fr/companies/a/jobs/1"))
        .with_failure(wttj.detail("/fr/companies/b/jobs/2").as_str(), broken("/fr/companies/b/jobs/2"));

    let crawler = crawler(Arc::new(fetcher));
    let run = crawler
        .start(request(&[SourceId::HelloWork, SourceId::WelcomeToTheJungle], 1))
        .unwrap();
    let (records, summary) = run.collect().await;

    assert_eq!(records.len(), 5);
    assert!(records.iter().all(|r| r.source() == SourceId::HelloWork));
    assert_eq!(summary.records_emitted, 5);
    assert_eq!(summary.soft_failures.len(), 2);
    assert!(summary
        .soft_failures
        .iter()
        .all(|f| f.source == SourceId::WelcomeToTheJungle && f.kind == "status"));
    assert!(summary.failures_for(SourceId::HelloWork).is_empty());

    let wttj_report = summary.report(SourceId::WelcomeToTheJungle).unwrap();
    assert_eq!(wttj_report.pages_fetched, 1);
    assert_eq!(wttj_report.records_produced, 0);
}

#[tokio::test]
async fn test_empty_first_page_stops_source() {
    let first = Urls::of(SourceId::HelloWork).first;
    let expected = first.clone();
    let mut fetcher = MockFetcher::new();
    fetcher
        .expect_fetch()
        .times(1)
        .withf(move |url, _, _| *url == expected)
        .returning(|url, _, _| Ok(FetchedPage::html(url.clone(), hellowork_listing(&[]))));

    let crawler = crawler(Arc::new(fetcher));
    let (records, summary) = crawler
        .start(request(&[SourceId::HelloWork], 3))
        .unwrap()
        .collect()
        .await;

    assert!(records.is_empty());
    let report = summary.report(SourceId::HelloWork).unwrap();
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.termination, TerminationReason::NoListings);
}

#[tokio::test]
async fn test_max_pages_bounds_listing_fetches() {
    let hw = Urls::of(SourceId::HelloWork);
    let page2 = Urls::page(SourceId::HelloWork, 2);
    let page3 = Urls::page(SourceId::HelloWork, 3);

    let fetcher = hellowork_page(StaticFetcher::new(), &hw.first, &[1]);
    let fetcher = hellowork_page(fetcher, &page2, &[2]);
    let fetcher = Arc::new(hellowork_page(fetcher, &page3, &[3]));

    let crawler = crawler(fetcher.clone());
    let (records, summary) = crawler
        .start(request(&[SourceId::HelloWork], 2))
        .unwrap()
        .collect()
        .await;

    assert_eq!(records.len(), 2);
    assert_eq!(fetcher.calls_to(page3.as_str()), 0);
    let report = summary.report(SourceId::HelloWork).unwrap();
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.termination, TerminationReason::MaxPagesReached);
}

#[tokio::test]
async fn test_duplicate_offers_delivered_once() {
    let hw = Urls::of(SourceId::HelloWork);
    let wttj = Urls::of(SourceId::WelcomeToTheJungle);
    let page2 = Urls::page(SourceId::HelloWork, 2);

    // Page 2 repeats offer 1; the WTTJ offer redirects to the same canonical page.
    let fetcher = hellowork_page(StaticFetcher::new(), &hw.first, &[1]);
    let fetcher = hellowork_page(fetcher, &page2, &[1]);
    let wttj_detail = wttj.detail("/fr/companies/acme/jobs/1");
    let fetcher = Arc::new(
        fetcher
            .with_page(
                wttj.first.as_str(),
                wttj_listing(&[ListingCard::new("Data Analyst", "/fr/companies/acme/jobs/1")], None),
            )
            .with_response(
                FetchedPage::html(wttj_detail, detail_body("Offer 1"))
                    .redirected_to(hw.detail("/fr-fr/emplois/1.html")),
            ),
    );

    let crawler = crawler(fetcher.clone());
    let (records, summary) = crawler
        .start(request(&[SourceId::HelloWork, SourceId::WelcomeToTheJungle], 2))
        .unwrap()
        .collect()
        .await;

    assert_eq!(records.len(), 1);
    assert_eq!(summary.records_emitted, 1);
    assert_eq!(
        fetcher.calls_to(hw.detail("/fr-fr/emplois/1.html").as_str()),
        1
    );

    let hw_report = summary.report(SourceId::HelloWork).unwrap();
    assert_eq!(hw_report.duplicates_skipped, 1);
    assert_eq!(hw_report.records_produced, 1);
    let wttj_report = summary.report(SourceId::WelcomeToTheJungle).unwrap();
    assert_eq!(wttj_report.records_produced, 1);
    assert_eq!(
        hw_report.records_delivered + wttj_report.records_delivered,
        1
    );
}

#[tokio::test]
async fn test_detail_records_keep_listing_order() {
    let hw = Urls::of(SourceId::HelloWork);
    let mut fetcher = hellowork_page(StaticFetcher::new(), &hw.first, &[1, 2, 3, 4]);
    for (n, delay) in [(1, 80), (2, 40), (3, 20), (4, 0)] {
        fetcher = fetcher.with_delay(
            hw.detail(&format!("/fr-fr/emplois/{n}.html")).as_str(),
            Duration::from_millis(delay),
        );
    }

    let crawler = crawler(Arc::new(fetcher));
    let (records, _) = crawler
        .start(request(&[SourceId::HelloWork], 1))
        .unwrap()
        .collect()
        .await;

    let summaries: Vec<_> = records.iter().filter_map(|r| r.summary()).collect();
    assert_eq!(summaries, vec!["Offer 1", "Offer 2", "Offer 3", "Offer 4"]);
}

#[tokio::test]
async fn test_slow_detail_page_times_out() {
    let hw = Urls::of(SourceId::HelloWork);
    let slow = hw.detail("/fr-fr/emplois/2.html");
    let fetcher = hellowork_page(StaticFetcher::new(), &hw.first, &[1, 2])
        .with_delay(slow.as_str(), Duration::from_millis(500));

    let crawler = CrawlerBuilder::new()
        .with_config(config().with_fetch(FetchConfig::new().with_timeout(0.05)))
        .with_fetcher(Arc::new(fetcher))
        .build()
        .unwrap();
    let (records, summary) = crawler
        .start(request(&[SourceId::HelloWork], 1))
        .unwrap()
        .collect()
        .await;

    assert_eq!(records.len(), 1);
    assert_eq!(summary.soft_failures.len(), 1);
    assert_eq!(summary.soft_failures[0].kind, "timeout");
    assert_eq!(summary.soft_failures[0].url, slow.to_string());
}

#[tokio::test]
async fn test_cancellation_stops_crawl_promptly() {
    let hw = Urls::of(SourceId::HelloWork);
    let fetcher = hellowork_page(StaticFetcher::new(), &hw.first, &[1, 2, 3])
        .with_default_delay(Duration::from_secs(10));
    let fetcher = Arc::new(fetcher);

    let crawler = CrawlerBuilder::new()
        .with_config(config().with_fetch(FetchConfig::new().with_timeout(30.0)))
        .with_fetcher(fetcher)
        .build()
        .unwrap();
    let run = crawler.start(request(&[SourceId::HelloWork], 5)).unwrap();
    let token = run.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel("user interrupt");
    });

    let (records, summary) = tokio::time::timeout(Duration::from_secs(2), run.collect())
        .await
        .unwrap();

    assert!(records.is_empty());
    let report = summary.report(SourceId::HelloWork).unwrap();
    assert_eq!(report.termination, TerminationReason::Cancelled);
    assert_eq!(report.pages_fetched, 0);
}

#[tokio::test]
async fn test_crawl_drains_into_record_sink() {
    let hw = Urls::of(SourceId::HelloWork);
    let fetcher = hellowork_page(StaticFetcher::new(), &hw.first, &[1, 2, 3]);
    let events = Arc::new(CollectingEventSink::new());

    let crawler = CrawlerBuilder::new()
        .with_config(config())
        .with_fetcher(Arc::new(fetcher))
        .with_event_sink(events.clone())
        .build()
        .unwrap();
    let sink = CollectingRecordSink::new();
    let summary = crawler
        .crawl(request(&[SourceId::HelloWork], 1), &sink)
        .await
        .unwrap();

    assert_eq!(sink.len(), 3);
    assert_eq!(summary.records_emitted, 3);
    assert_eq!(events.events_of_type("crawl.record_emitted").len(), 3);
    assert_eq!(events.events_of_type("crawl.source_finished").len(), 1);

    let first = &sink.records()[0];
    assert_eq!(first.title(), Some("Data Analyst 1"));
    assert_eq!(first.company_name(), Some("Acme"));
    assert_eq!(first.missions(), "Analyser\nBac+5");
    assert_eq!(first.profile(), "Bac+5");
}

#[tokio::test]
async fn test_invalid_request_fetches_nothing() {
    let fetcher = Arc::new(StaticFetcher::new());
    let crawler = crawler(fetcher.clone());

    let zero_pages = crawler.start(request(&[SourceId::HelloWork], 0)).unwrap_err();
    assert_eq!(zero_pages.field.as_deref(), Some("max_pages"));

    let no_sources = crawler.start(CrawlRequest::new(JOB, PLACE).with_sources([])).unwrap_err();
    assert_eq!(no_sources.field.as_deref(), Some("sources"));

    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn test_listing_failure_ends_source_only() {
    let hw = Urls::of(SourceId::HelloWork);
    let wttj = Urls::of(SourceId::WelcomeToTheJungle);
    let fetcher = hellowork_page(StaticFetcher::new(), &hw.first, &[1])
        .with_failure(wttj.first.as_str(), FetchError::Http("connection reset".into()));

    let crawler = crawler(Arc::new(fetcher));
    let (records, summary) = crawler
        .start(request(&[SourceId::HelloWork, SourceId::WelcomeToTheJungle], 1))
        .unwrap()
        .collect()
        .await;

    assert_eq!(records.len(), 1);
    let wttj_report = summary.report(SourceId::WelcomeToTheJungle).unwrap();
    assert_eq!(wttj_report.termination, TerminationReason::ListingFetchFailed);
    assert_eq!(wttj_report.failures.len(), 1);
    assert_eq!(wttj_report.failures[0].kind, "http");
}

#[tokio::test]
async fn test_next_link_pagination_follows_until_link_missing() {
    let wttj = Urls::of(SourceId::WelcomeToTheJungle);
    let page2 = wttj.detail("/fr/jobs?query=data&page=2");
    let first_cards = [ListingCard::new("Analyste", "/fr/companies/a/jobs/1").with_company("A")];
    let second_cards = [ListingCard::new("Data Engineer", "/fr/companies/b/jobs/2").with_company("B")];

    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_page(wttj.first.as_str(), wttj_listing(&first_cards, Some(page2.as_str())))
            .with_page(page2.as_str(), wttj_listing(&second_cards, None))
            .with_page(wttj.detail("/fr/companies/a/jobs/1").as_str(), detail_body("Offer A"))
            .with_page(wttj.detail("/fr/companies/b/jobs/2").as_str(), detail_body("Offer B")),
    );

    let crawler = crawler(fetcher.clone());
    let (records, summary) = crawler
        .start(request(&[SourceId::WelcomeToTheJungle], 3))
        .unwrap()
        .collect()
        .await;

    let companies: Vec<_> = records.iter().filter_map(|r| r.company_name()).collect();
    assert_eq!(companies, vec!["A", "B"]);
    assert_eq!(fetcher.calls_to(page2.as_str()), 1);

    let report = summary.report(SourceId::WelcomeToTheJungle).unwrap();
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.termination, TerminationReason::NoNextPage);
}

#[tokio::test]
async fn test_each_source_fetches_in_its_render_mode() {
    let hw = Urls::of(SourceId::HelloWork);
    let wttj = Urls::of(SourceId::WelcomeToTheJungle);
    let wttj_cards = [ListingCard::new("Analyste", "/fr/companies/a/jobs/1").with_company("A")];
    let fetcher = hellowork_page(StaticFetcher::new(), &hw.first, &[1, 2])
        .with_page(wttj.first.as_str(), wttj_listing(&wttj_cards, None))
        .with_page(wttj.detail("/fr/companies/a/jobs/1").as_str(), detail_body("Offer A"));
    let fetcher = Arc::new(fetcher);

    let crawler = crawler(fetcher.clone());
    let (records, _) = crawler
        .start(request(&[SourceId::HelloWork, SourceId::WelcomeToTheJungle], 1))
        .unwrap()
        .collect()
        .await;
    assert_eq!(records.len(), 3);

    let calls: Vec<(Url, RenderMode)> = fetcher.calls().into_iter().zip(fetcher.render_modes()).collect();
    assert_eq!(calls.len(), 5);
    for (url, mode) in calls {
        let expected = if url.host_str() == hw.first.host_str() {
            RenderMode::Plain
        } else {
            RenderMode::Script
        };
        assert_eq!(mode, expected, "render mode for {url}");
    }
}

#[tokio::test]
async fn test_cancellation_during_detail_fetches_emits_nothing() {
    let hw = Urls::of(SourceId::HelloWork);
    let mut fetcher = hellowork_page(StaticFetcher::new(), &hw.first, &[1, 2, 3]);
    for n in [2, 3] {
        fetcher = fetcher.with_delay(
            hw.detail(&format!("/fr-fr/emplois/{n}.html")).as_str(),
            Duration::from_secs(10),
        );
    }
    let events = Arc::new(CollectingEventSink::new());

    let crawler = CrawlerBuilder::new()
        .with_config(config())
        .with_fetcher(Arc::new(fetcher))
        .with_event_sink(events.clone())
        .build()
        .unwrap();
    let run = crawler.start(request(&[SourceId::HelloWork], 5)).unwrap();

    // Wait until the listing page is in, so detail fetches are in flight.
    tokio::time::timeout(Duration::from_secs(2), async {
        while events.events_of_type("crawl.page_fetched").is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    run.cancel("user interrupt");

    let (records, summary) = tokio::time::timeout(Duration::from_secs(2), run.collect())
        .await
        .unwrap();

    assert!(records.is_empty());
    assert!(events.events_of_type("crawl.record_emitted").is_empty());
    let report = summary.report(SourceId::HelloWork).unwrap();
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.records_produced, 0);
    assert_eq!(report.termination, TerminationReason::Cancelled);
    assert!(report.failures.is_empty());
}
