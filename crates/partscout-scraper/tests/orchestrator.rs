//! Integration tests for `SearchOrchestrator::search`.
//!
//! Every test runs against `FakeRenderer`, which serves canned pages per URL
//! and counts session opens and closes, so no browser or network is needed.

use std::sync::Arc;
use std::time::Duration;

use partscout_core::{
    Category, SearchQuery, SourceDefinition, SourceLayout, SourceRegistry,
};
use partscout_scraper::{FakeRenderer, SearchError, SearchOrchestrator, SearchSettings};

const SEARCH_URL: &str = "https://search.test/?q={query}";

fn settings() -> SearchSettings {
    SearchSettings {
        general_search_url: SEARCH_URL.to_string(),
        general_result_limit: 5,
        specialized_result_limit: 3,
        general_wait: Duration::from_secs(10),
        specialized_wait: Duration::from_secs(15),
        settle_delay: Duration::ZERO,
    }
}

fn listing_source(name: &str, host: &str) -> SourceDefinition {
    SourceDefinition {
        name: name.to_string(),
        query_url_template: format!("https://{host}/search?q={{query}}"),
        item_locator: "div.item".to_string(),
        layout: SourceLayout::Listing {
            title_locator: "h2".to_string(),
            price_locator: "span.price".to_string(),
            part_number_locator: "span.pn".to_string(),
            specs_locator: "div.specs".to_string(),
            weight_locator: "div.weight".to_string(),
        },
    }
}

fn registry(sources: Vec<SourceDefinition>) -> Arc<SourceRegistry> {
    Arc::new(SourceRegistry::new(sources).expect("valid test registry"))
}

fn orchestrator(renderer: FakeRenderer, sources: Vec<SourceDefinition>) -> SearchOrchestrator {
    SearchOrchestrator::new(Arc::new(renderer), registry(sources), settings())
}

fn query(text: &str, categories: &[Category]) -> SearchQuery {
    SearchQuery::new(text, Some(categories.to_vec())).expect("valid query")
}

fn search_page(links: &[&str]) -> String {
    let entries: String = links
        .iter()
        .enumerate()
        .map(|(i, link)| {
            format!(
                r#"<div class="g"><a href="{link}"><h3>Result {i}</h3></a><div class="VwiC3b">Snippet {i}</div></div>"#
            )
        })
        .collect();
    format!("<html><body>{entries}</body></html>")
}

fn product_page(part: &str) -> String {
    format!("<html><body><p>Part #: {part}</p><p>Price: $10.00</p></body></html>")
}

fn listing_page(titles: &[&str]) -> String {
    let items: String = titles
        .iter()
        .enumerate()
        .map(|(i, t)| {
            format!(
                r#"<div class="item"><h2>{t}</h2><span class="price">$5.00</span><span class="pn">P-{i}</span></div>"#
            )
        })
        .collect();
    format!("<html><body>{items}</body></html>")
}

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn one_session_per_search_closed_once() {
    let renderer = FakeRenderer::new()
        .with_page(
            "https://search.test/?q=brake+pads",
            search_page(&["https://a.test/1"]),
        )
        .with_page("https://a.test/1", product_page("A1"));
    let stats = renderer.stats();
    let orchestrator = orchestrator(renderer, vec![listing_source("Shop", "shop.test")]);

    let results = orchestrator
        .search(&query("brake pads", &[Category::General, Category::Specialized]))
        .await
        .expect("search succeeds");

    assert_eq!(results.len(), 1);
    assert_eq!(stats.opens(), 1);
    assert_eq!(stats.closes(), 1);
}

#[tokio::test]
async fn acquisition_failure_is_resource_init() {
    let renderer = FakeRenderer::new().failing_open();
    let stats = renderer.stats();
    let orchestrator = orchestrator(renderer, vec![]);

    let err = orchestrator
        .search(&query("rotor", &[Category::General]))
        .await
        .expect_err("no session");
    assert!(
        matches!(err, SearchError::ResourceInit(_)),
        "expected ResourceInit, got: {err:?}"
    );
    assert_eq!(stats.closes(), 0);
}

#[tokio::test]
async fn empty_category_list_opens_no_session() {
    let renderer = FakeRenderer::new();
    let stats = renderer.stats();
    let orchestrator = orchestrator(renderer, vec![]);

    let results = orchestrator
        .search(&query("rotor", &[]))
        .await
        .expect("search succeeds");
    assert!(results.is_empty());
    assert_eq!(stats.opens(), 0);
}

#[tokio::test]
async fn panic_mid_search_still_closes_session() {
    let renderer = FakeRenderer::new()
        .with_page(
            "https://search.test/?q=rotor",
            search_page(&["https://boom.test/"]),
        )
        .with_panicking_page("https://boom.test/");
    let stats = renderer.stats();
    let orchestrator = orchestrator(renderer, vec![]);

    let handle = tokio::spawn(async move {
        orchestrator
            .search(&query("rotor", &[Category::General]))
            .await
    });
    assert!(handle.await.is_err(), "search task should panic");

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(stats.closes(), 1);
}

// ---------------------------------------------------------------------------
// General category
// ---------------------------------------------------------------------------

#[tokio::test]
async fn general_results_follow_links_and_extract() {
    let renderer = FakeRenderer::new()
        .with_page(
            "https://search.test/?q=alternator",
            search_page(&["https://a.test/1", "https://b.test/2"]),
        )
        .with_page("https://a.test/1", product_page("A1"))
        .with_page("https://b.test/2", product_page("B2"));
    let orchestrator = orchestrator(renderer, vec![]);

    let results = orchestrator
        .search(&query("alternator", &[Category::General]))
        .await
        .expect("search succeeds");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].category, Category::General);
    assert_eq!(results[0].source_url, "https://a.test/1");
    assert_eq!(results[0].title.as_deref(), Some("Result 0"));
    assert_eq!(results[0].description.as_deref(), Some("Snippet 0"));
    assert_eq!(results[0].data.part_number.as_deref(), Some("A1"));
    assert_eq!(results[1].data.part_number.as_deref(), Some("B2"));
    assert_eq!(results[1].data.price, Some(10.0));
}

#[tokio::test]
async fn navigation_failure_mid_loop_keeps_earlier_results() {
    let renderer = FakeRenderer::new()
        .with_page(
            "https://search.test/?q=rotor",
            search_page(&["https://a.test/1", "https://down.test/2", "https://c.test/3"]),
        )
        .with_page("https://a.test/1", product_page("A1"))
        .with_failing_page("https://down.test/2")
        .with_page("https://c.test/3", product_page("C3"));
    let stats = renderer.stats();
    let orchestrator = orchestrator(renderer, vec![]);

    let results = orchestrator
        .search(&query("rotor", &[Category::General]))
        .await
        .expect("search succeeds");

    let urls: Vec<_> = results.iter().map(|r| r.source_url.as_str()).collect();
    assert_eq!(urls, vec!["https://a.test/1", "https://c.test/3"]);
    assert_eq!(stats.closes(), 1);
}

#[tokio::test]
async fn general_timeout_yields_no_results() {
    // No canned search page: the fake renders an empty document, so the
    // wait for result entries times out.
    let renderer = FakeRenderer::new();
    let stats = renderer.stats();
    let orchestrator = orchestrator(renderer, vec![]);

    let results = orchestrator
        .search(&query("rotor", &[Category::General]))
        .await
        .expect("search succeeds");
    assert!(results.is_empty());
    assert_eq!(stats.navigations(), vec!["https://search.test/?q=rotor"]);
    assert_eq!(stats.closes(), 1);
}

#[tokio::test]
async fn general_result_limit_is_applied_before_link_filter() {
    let links: Vec<String> = (0..7).map(|i| format!("https://r.test/{i}")).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
    let mut renderer =
        FakeRenderer::new().with_page("https://search.test/?q=rotor", search_page(&link_refs));
    for link in &links {
        renderer = renderer.with_page(link.clone(), product_page("X1"));
    }
    let orchestrator = orchestrator(renderer, vec![]);

    let results = orchestrator
        .search(&query("rotor", &[Category::General]))
        .await
        .expect("search succeeds");
    assert_eq!(results.len(), 5);
}

// ---------------------------------------------------------------------------
// Specialized category
// ---------------------------------------------------------------------------

#[tokio::test]
async fn timed_out_source_is_skipped_and_others_still_run() {
    let renderer = FakeRenderer::new()
        // "slow.test" has no canned page and therefore times out.
        .with_page(
            "https://fast.test/search?q=rotor",
            listing_page(&["One", "Two", "Three", "Four"]),
        );
    let orchestrator = orchestrator(
        renderer,
        vec![
            listing_source("Slow", "slow.test"),
            listing_source("Fast", "fast.test"),
        ],
    );

    let results = orchestrator
        .search(&query("rotor", &[Category::Specialized]))
        .await
        .expect("search succeeds");

    assert_eq!(results.len(), 3, "top three items from the fast source");
    for result in &results {
        assert_eq!(result.category, Category::Specialized);
        assert_eq!(result.source_url, "https://fast.test/search?q=rotor");
        assert_eq!(result.description.as_deref(), Some("Part from Fast"));
        assert_eq!(result.data.source_name.as_deref(), Some("Fast"));
    }
    assert_eq!(results[0].title.as_deref(), Some("One"));
    assert_eq!(results[0].data.part_number.as_deref(), Some("P-0"));
    assert_eq!(results[0].data.price, Some(5.0));
}

#[tokio::test]
async fn failing_source_navigation_is_contained() {
    let renderer = FakeRenderer::new()
        .with_failing_page("https://down.test/search?q=rotor")
        .with_page("https://up.test/search?q=rotor", listing_page(&["Only"]));
    let stats = renderer.stats();
    let orchestrator = orchestrator(
        renderer,
        vec![
            listing_source("Down", "down.test"),
            listing_source("Up", "up.test"),
        ],
    );

    let results = orchestrator
        .search(&query("rotor", &[Category::Specialized]))
        .await
        .expect("search succeeds");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].data.source_name.as_deref(), Some("Up"));
    assert_eq!(stats.closes(), 1);
}

#[tokio::test]
async fn detail_page_sources_follow_item_links() {
    let source = SourceDefinition {
        name: "Hub".to_string(),
        query_url_template: "https://hub.test/find?q={query}".to_string(),
        item_locator: "li.hit".to_string(),
        layout: SourceLayout::DetailPage {
            title_locator: "span.name".to_string(),
            link_locator: "a".to_string(),
        },
    };
    let renderer = FakeRenderer::new()
        .with_page(
            "https://hub.test/find?q=starter",
            r#"<ul><li class="hit"><span class="name">Starter Motor</span><a href="/p/9">view</a></li></ul>"#,
        )
        .with_page("https://hub.test/p/9", product_page("SM-9"));
    let orchestrator = orchestrator(renderer, vec![source]);

    let results = orchestrator
        .search(&query("starter", &[Category::Specialized]))
        .await
        .expect("search succeeds");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].source_url, "https://hub.test/p/9");
    assert_eq!(results[0].title.as_deref(), Some("Starter Motor"));
    assert_eq!(results[0].data.part_number.as_deref(), Some("SM-9"));
    assert_eq!(results[0].data.source_name.as_deref(), Some("Hub"));
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn categories_are_concatenated_in_requested_order() {
    let renderer = FakeRenderer::new()
        .with_page(
            "https://search.test/?q=rotor",
            search_page(&["https://a.test/1"]),
        )
        .with_page("https://a.test/1", product_page("A1"))
        .with_page("https://shop.test/search?q=rotor", listing_page(&["S"]));
    let orchestrator = orchestrator(renderer, vec![listing_source("Shop", "shop.test")]);

    let results = orchestrator
        .search(&query("rotor", &[Category::Specialized, Category::General]))
        .await
        .expect("search succeeds");

    let categories: Vec<_> = results.iter().map(|r| r.category).collect();
    assert_eq!(categories, vec![Category::Specialized, Category::General]);
}
