//! Integration tests for the lookup orchestrator
//!
//! The fetch collaborator is replaced by in-process fetchers so each test
//! controls exactly what the "network" does.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_test::{assert_err, assert_ok};
use wikiquote_search::{
    DocumentFetcher, FetchOutcome, LookupConfig, LookupOutcome, LookupSource, QuoteCache, QuoteSearch,
    Result, SearchError,
};

const OSCAR_WILDE: &str = include_str!("fixtures/oscar_wilde.html");

/// Serves the page once, then behaves as if the network went away
#[derive(Debug)]
struct DisconnectingFetcher {
    page: String,
    calls: AtomicUsize,
}

#[async_trait]
impl DocumentFetcher for DisconnectingFetcher {
    async fn fetch_document(&self, _url: &str) -> Result<FetchOutcome> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(FetchOutcome::Document(self.page.clone()))
        } else {
            Err(SearchError::Other("fetcher disconnected".to_string()))
        }
    }
}

/// Serves a fixed outcome after a delay
#[derive(Debug)]
struct SlowFetcher {
    delay: Duration,
    outcome: FetchOutcome,
    calls: AtomicUsize,
}

impl SlowFetcher {
    fn new(delay: Duration, outcome: FetchOutcome) -> Arc<Self> {
        Arc::new(Self {
            delay,
            outcome,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentFetcher for SlowFetcher {
    async fn fetch_document(&self, _url: &str) -> Result<FetchOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(self.outcome.clone())
    }
}

fn config(timeout: Duration) -> LookupConfig {
    LookupConfig {
        base_url: "http://wiki.test/wiki/".to_string(),
        fetch_timeout: timeout,
    }
}

#[tokio::test]
async fn test_miss_then_hit_without_network() {
    let fetcher = Arc::new(DisconnectingFetcher {
        page: OSCAR_WILDE.to_string(),
        calls: AtomicUsize::new(0),
    });
    let search = QuoteSearch::new(
        config(Duration::from_secs(1)),
        QuoteCache::with_capacity(10),
        fetcher.clone(),
    );

    let first = assert_ok!(search.lookup("!wq search oscar wilde").await);
    assert!(matches!(
        first,
        LookupOutcome::Found {
            source: LookupSource::Fetched,
            ..
        }
    ));
    assert_eq!(first.quotes().len(), 4);

    let second = assert_ok!(search.lookup("!WQ SEARCH Oscar WILDE").await);
    assert!(second.is_cache_hit());
    assert_eq!(second.quotes(), first.quotes());
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

    let stats = search.stats().await;
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);
}

#[tokio::test]
async fn test_fetch_failure_is_not_found_and_not_cached() {
    let fetcher = Arc::new(DisconnectingFetcher {
        page: OSCAR_WILDE.to_string(),
        calls: AtomicUsize::new(1),
    });
    let search = QuoteSearch::new(
        config(Duration::from_secs(1)),
        QuoteCache::with_capacity(10),
        fetcher,
    );

    let outcome = assert_ok!(search.lookup("!wq search oscar wilde").await);
    assert_eq!(outcome, LookupOutcome::NotFound);
    assert_eq!(search.cached_len().await, 0);
}

#[tokio::test]
async fn test_empty_result_is_cached() {
    let page = "<html><body><p>A page with no quote section.</p></body></html>";
    let fetcher = SlowFetcher::new(Duration::ZERO, FetchOutcome::Document(page.to_string()));
    let search = QuoteSearch::new(
        config(Duration::from_secs(1)),
        QuoteCache::with_capacity(10),
        fetcher.clone(),
    );

    let first = assert_ok!(search.lookup("!wq search empty page").await);
    assert!(first.is_found());
    assert!(first.quotes().is_empty());

    let second = assert_ok!(search.lookup("!wq search empty page").await);
    assert!(second.is_cache_hit());
    assert!(second.quotes().is_empty());
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_timeout_is_not_found() {
    let fetcher = SlowFetcher::new(
        Duration::from_secs(5),
        FetchOutcome::Document(OSCAR_WILDE.to_string()),
    );
    let search = QuoteSearch::new(
        config(Duration::from_millis(50)),
        QuoteCache::with_capacity(10),
        fetcher.clone(),
    );

    let outcome = assert_ok!(search.lookup("!wq search oscar wilde").await);
    assert_eq!(outcome, LookupOutcome::NotFound);
    assert_eq!(search.cached_len().await, 0);
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_concurrent_identical_lookups_fetch_once() {
    let fetcher = SlowFetcher::new(
        Duration::from_millis(50),
        FetchOutcome::Document(OSCAR_WILDE.to_string()),
    );
    let search = QuoteSearch::new(
        config(Duration::from_secs(2)),
        QuoteCache::with_capacity(10),
        fetcher.clone(),
    );

    let lookups = (0..8).map(|i| {
        let query = if i % 2 == 0 {
            "!wq search oscar wilde"
        } else {
            "!WQ SEARCH OSCAR WILDE"
        };
        search.lookup(query)
    });
    let outcomes = futures::future::join_all(lookups).await;

    assert_eq!(fetcher.calls(), 1);
    for outcome in outcomes {
        let outcome = assert_ok!(outcome);
        assert_eq!(outcome.quotes().len(), 4);
    }
}

#[tokio::test]
async fn test_concurrent_lookups_share_not_found() {
    let fetcher = SlowFetcher::new(Duration::from_millis(200), FetchOutcome::NotFound);
    let search = QuoteSearch::new(
        config(Duration::from_millis(300)),
        QuoteCache::with_capacity(10),
        fetcher.clone(),
    );

    let started = Instant::now();
    let lookups = (0..5).map(|_| search.lookup("!wq search nobody"));
    let outcomes = futures::future::join_all(lookups).await;
    let elapsed = started.elapsed();

    assert_eq!(fetcher.calls(), 1);
    assert!(elapsed < Duration::from_millis(600), "took {:?}", elapsed);
    for outcome in outcomes {
        assert_eq!(assert_ok!(outcome), LookupOutcome::NotFound);
    }
    assert_eq!(search.cached_len().await, 0);

    // The next wave fetches again since not-found is never cached
    assert_eq!(assert_ok!(search.lookup("!wq search nobody").await), LookupOutcome::NotFound);
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn test_concurrent_lookups_share_timeout() {
    let fetcher = SlowFetcher::new(Duration::from_secs(5), FetchOutcome::NotFound);
    let search = QuoteSearch::new(
        config(Duration::from_millis(100)),
        QuoteCache::with_capacity(10),
        fetcher.clone(),
    );

    let started = Instant::now();
    let lookups = (0..4).map(|_| search.lookup("!wq search slow page"));
    let outcomes = futures::future::join_all(lookups).await;

    assert!(started.elapsed() < Duration::from_millis(400));
    assert_eq!(fetcher.calls(), 1);
    assert!(outcomes.into_iter().all(|o| matches!(o, Ok(LookupOutcome::NotFound))));
}

#[tokio::test]
async fn test_distinct_keys_fetch_independently() {
    let fetcher = SlowFetcher::new(
        Duration::from_millis(10),
        FetchOutcome::Document(OSCAR_WILDE.to_string()),
    );
    let search = QuoteSearch::new(
        config(Duration::from_secs(2)),
        QuoteCache::with_capacity(10),
        fetcher.clone(),
    );

    let (a, b) = tokio::join!(
        search.lookup("!wq search oscar wilde"),
        search.lookup("!wq search mark twain")
    );
    assert_ok!(a);
    assert_ok!(b);
    assert_eq!(fetcher.calls(), 2);
    assert_eq!(search.cached_len().await, 2);
}

#[tokio::test]
async fn test_query_without_subject_is_rejected() {
    let fetcher = SlowFetcher::new(Duration::ZERO, FetchOutcome::NotFound);
    let search = QuoteSearch::new(
        config(Duration::from_secs(1)),
        QuoteCache::with_capacity(10),
        fetcher.clone(),
    );

    let error = assert_err!(search.lookup("!wq search   ").await);
    assert!(matches!(error, SearchError::InvalidQuery(_)));
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_capacity_bounds_lookups() {
    let fetcher = SlowFetcher::new(Duration::ZERO, FetchOutcome::Document(OSCAR_WILDE.to_string()));
    let search = QuoteSearch::new(
        config(Duration::from_secs(1)),
        QuoteCache::with_capacity(2),
        fetcher.clone(),
    );

    for subject in ["a", "b", "c"] {
        assert_ok!(search.lookup(&format!("!wq search {}", subject)).await);
    }
    assert_eq!(search.cached_len().await, 2);

    // "a" was evicted, so it has to be fetched again
    let again = assert_ok!(search.lookup("!wq search a").await);
    assert!(!again.is_cache_hit());
    assert_eq!(fetcher.calls(), 4);
}
