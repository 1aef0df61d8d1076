// Tests for the frontier pipeline: resolve -> filter -> queue

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use trawl_scanner::crawler::admit;
use trawl_scanner::filters::MAX_CHROME_URL_LENGTH;
use trawl_scanner::utils::transform_index;
use trawl_scanner::{Filter, FilterOptions, Frontier, Request, Response, SimpleFilter, Strategy};
use url::Url;

fn parent(url: &str, depth: usize) -> Response {
    let mut response = Response::new(Url::parse(url).unwrap());
    response.depth = depth;
    response.root_hostname = response.url.host_str().unwrap_or_default().to_string();
    response.status_code = 200;
    response
}

// ============================================================================
// Admission
// ============================================================================

#[test]
fn test_equivalent_links_admitted_once() {
    let filter = SimpleFilter::new().unwrap();
    let frontier = Frontier::new(Strategy::BreadthFirst).unwrap();
    let page = parent("https://example.com/docs/index.html", 0);

    let candidates = [
        "guide.html",
        "./guide.html",
        "/docs/guide.html",
        "guide.html#install",
        "https://example.com/docs/guide.html",
        "../docs/guide.html",
    ];
    let admitted = candidates
        .iter()
        .map(|c| Request::from_response(c, page.url.as_str(), "a", "href", &page))
        .filter(|r| admit(&filter, &frontier, r.clone(), 3))
        .count();

    assert_eq!(admitted, 1);
    let queued = frontier.pop().unwrap();
    assert_eq!(queued.url, "https://example.com/docs/guide.html");
    assert_eq!(queued.depth, 1);
    assert_eq!(queued.root_hostname, "example.com");
}

#[test]
fn test_unparseable_and_anchor_links_are_skipped() {
    let page = parent("https://example.com/path/index.html?x=1#anchor", 0);
    for candidate in ["#section", "", "%zz"] {
        let request = Request::from_response(candidate, "", "a", "href", &page);
        assert!(!request.is_navigable(), "{:?} should not be navigable", candidate);
    }
}

#[test]
fn test_generated_loops_never_reach_the_frontier() {
    let filter = SimpleFilter::new().unwrap();
    let frontier = Frontier::new(Strategy::DepthFirst).unwrap();
    let mut page = parent("https://example.com/a/", 0);

    // Each hop appends the same segment again, like a broken relative link.
    let mut admitted = 0;
    for _ in 0..20 {
        let request = Request::from_response("a/", "", "a", "href", &page);
        if !admit(&filter, &frontier, request.clone(), 100) {
            break;
        }
        admitted += 1;
        page = parent(&request.url, request.depth);
    }

    assert!(admitted < 20, "loop was never cut");
    assert_eq!(frontier.len(), admitted);
}

#[test]
fn test_overlong_urls_are_cycles() {
    let filter = SimpleFilter::with_options(&FilterOptions::default()).unwrap();
    let url = format!("https://example.com/?q={}", "x".repeat(MAX_CHROME_URL_LENGTH));
    assert!(filter.is_cycle(&url));
    assert!(!filter.is_cycle("https://example.com"));
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_workers_admit_each_url_once() {
    let filter: Arc<dyn Filter> = Arc::new(SimpleFilter::new().unwrap());
    let frontier = Arc::new(Frontier::new(Strategy::BreadthFirst).unwrap());
    let admitted = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let filter = filter.clone();
        let frontier = frontier.clone();
        let admitted = admitted.clone();
        handles.push(tokio::spawn(async move {
            let page = parent("https://example.com/", 0);
            for i in 0..200 {
                let request =
                    Request::from_response(&format!("/item/{}", i), "", "a", "href", &page);
                if admit(filter.as_ref(), &frontier, request, 3) {
                    admitted.fetch_add(1, Ordering::SeqCst);
                }
                tokio::task::yield_now().await;
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(admitted.load(Ordering::SeqCst), 200);
    assert_eq!(frontier.len(), 200);
}

#[test]
fn test_independent_runs_do_not_share_state() {
    let first = SimpleFilter::new().unwrap();
    assert!(first.unique_url("https://example.com"));
    first.close();

    let second = SimpleFilter::new().unwrap();
    assert!(second.unique_url("https://example.com"));
    assert!(second.unique_content(b"body"));
    second.close();
}

// ============================================================================
// Ordering and helpers
// ============================================================================

#[test]
fn test_strategy_names_round_trip_through_display() {
    for strategy in [Strategy::BreadthFirst, Strategy::DepthFirst] {
        assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
    }
    assert_eq!(Strategy::from(-1).to_string(), "");
}

#[test]
fn test_transform_index_stays_in_bounds() {
    let arr = [10, 20, 30, 40];
    for index in -20..20 {
        let idx = transform_index(&arr, index);
        assert!(idx < arr.len(), "index {} mapped to {}", index, idx);
    }
    assert_eq!(transform_index(&arr, 4), 3);
    assert_eq!(transform_index::<u8>(&[], 4), 0);
}
