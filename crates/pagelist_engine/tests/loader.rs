use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pagelist_engine::{
    FetchError, LoadEvent, Page, PageFetcher, PageLoader, PageRequest, PagingSettings,
};
use pretty_assertions::assert_eq;

const WAIT: Duration = Duration::from_secs(2);

/// Serves `0..total` with a per-query delay, failing when `fail` is set.
struct ScriptedFetcher {
    total: usize,
    calls: Arc<AtomicUsize>,
}

#[derive(Debug, Clone)]
struct Query {
    delay: Duration,
    fail: bool,
}

impl Query {
    fn fast() -> Self {
        Self {
            delay: Duration::from_millis(5),
            fail: false,
        }
    }

    fn slow() -> Self {
        Self {
            delay: Duration::from_millis(400),
            fail: false,
        }
    }
}

#[async_trait::async_trait]
impl PageFetcher for ScriptedFetcher {
    type Query = Query;
    type Item = usize;

    async fn fetch(&self, query: &Query, request: PageRequest) -> Result<Page<usize>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(query.delay).await;
        if query.fail {
            return Err(FetchError::remote("server said no"));
        }
        let end = (request.offset + request.limit).min(self.total);
        let items = (request.offset.min(end)..end).collect();
        Ok(Page::with_total(items, self.total))
    }
}

fn loader(total: usize, settings: PagingSettings) -> (PageLoader<ScriptedFetcher>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let fetcher = ScriptedFetcher {
        total,
        calls: calls.clone(),
    };
    (PageLoader::new(fetcher, &settings), calls)
}

#[test]
fn delivers_requested_page() {
    pagelist_logging::initialize_for_tests();
    let (loader, _) = loader(45, PagingSettings::default());

    loader.load(Query::fast(), PageRequest::page(2, 20));

    assert_eq!(
        loader.recv_timeout(WAIT),
        Some(LoadEvent::Loaded {
            request: PageRequest {
                offset: 40,
                limit: 20
            },
            page: Page::with_total(vec![40, 41, 42, 43, 44], 45),
        })
    );
}

#[test]
fn new_load_cancels_the_previous_one() {
    pagelist_logging::initialize_for_tests();
    let (loader, calls) = loader(100, PagingSettings::default());

    loader.load(Query::slow(), PageRequest::page(1, 10));
    std::thread::sleep(Duration::from_millis(50));
    loader.load(Query::fast(), PageRequest::page(0, 10));

    let first = loader.recv_timeout(WAIT).expect("second load completes");
    match first {
        LoadEvent::Loaded { request, page } => {
            assert_eq!(request.offset, 0);
            assert_eq!(page.items, (0..10).collect::<Vec<_>>());
        }
        other => panic!("unexpected event {other:?}"),
    }
    // The slow one would have landed by now if it had not been cancelled.
    assert_eq!(loader.recv_timeout(Duration::from_millis(600)), None);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn cancel_silences_in_flight_fetch() {
    pagelist_logging::initialize_for_tests();
    let (loader, _) = loader(10, PagingSettings::default());

    loader.load(Query::slow(), PageRequest::page(0, 10));
    std::thread::sleep(Duration::from_millis(50));
    loader.cancel();

    assert_eq!(loader.recv_timeout(Duration::from_millis(700)), None);
}

#[test]
fn failures_are_reported_with_their_request() {
    pagelist_logging::initialize_for_tests();
    let (loader, _) = loader(10, PagingSettings::default());
    let query = Query {
        fail: true,
        ..Query::fast()
    };

    loader.load(query, PageRequest::portion(3, 4));

    assert_eq!(
        loader.recv_timeout(WAIT),
        Some(LoadEvent::Failed {
            request: PageRequest::portion(3, 4),
            error: FetchError::remote("server said no"),
        })
    );
}

#[test]
fn slow_fetch_times_out() {
    pagelist_logging::initialize_for_tests();
    let settings = PagingSettings {
        request_timeout_secs: Some(0),
        ..PagingSettings::default()
    };
    let (loader, _) = loader(10, settings);

    loader.load(Query::slow(), PageRequest::page(0, 5));

    match loader.recv_timeout(WAIT) {
        Some(LoadEvent::Failed { error, .. }) => assert_eq!(error, FetchError::Timeout),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[test]
fn page_past_the_end_is_empty() {
    let (loader, _) = loader(5, PagingSettings::default());
    loader.load(Query::fast(), PageRequest::page(3, 5));

    match loader.recv_timeout(WAIT) {
        Some(LoadEvent::Loaded { page, .. }) => {
            assert!(page.items.is_empty());
            assert_eq!(page.total_count, Some(5));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(loader.try_recv().is_none());
}

#[test]
fn unread_result_of_a_replaced_load_is_dropped() {
    pagelist_logging::initialize_for_tests();
    let (loader, calls) = loader(30, PagingSettings::default());

    loader.load(Query::fast(), PageRequest::page(1, 10));
    // Let the first fetch finish and sit in the channel unread.
    let deadline = std::time::Instant::now() + WAIT;
    while calls.load(Ordering::SeqCst) < 1 && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    std::thread::sleep(Duration::from_millis(100));
    loader.load(Query::fast(), PageRequest::page(0, 10));

    match loader.recv_timeout(WAIT) {
        Some(LoadEvent::Loaded { request, page }) => {
            assert_eq!(request, PageRequest::page(0, 10));
            assert_eq!(page.items, (0..10).collect::<Vec<_>>());
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(loader.recv_timeout(Duration::from_millis(200)), None);
}

#[test]
fn cancel_forgets_unread_result() {
    let (loader, _) = loader(10, PagingSettings::default());

    loader.load(Query::fast(), PageRequest::page(0, 5));
    std::thread::sleep(Duration::from_millis(150));
    loader.cancel();

    assert!(loader.try_recv().is_none());
}
