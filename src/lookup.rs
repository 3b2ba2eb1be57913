//! Cache-aside lookup orchestration
//!
//! One lookup runs in a fixed order: check the cache, fetch the page,
//! extract quotes, store them, return them. A cache hit stops after the
//! first step. Pages that do not exist are never cached; pages that exist
//! but hold no quotes are cached as an empty list.

use crate::cache::{CacheKey, CacheStats, CachedQuotes, Quote, QuoteCache, QuoteList};
use crate::config::AppConfig;
use crate::error::{Result, SearchError};
use crate::extract::extract_quotes;
use crate::fetch::{page_url, DocumentFetcher, FetchOutcome, HttpFetcher, DEFAULT_BASE_URL};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Where a successful lookup's quotes came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LookupSource {
    /// Served from memory; the page was fetched at `fetched_at`
    CacheHit { fetched_at: DateTime<Utc> },
    /// Fetched and extracted by this lookup
    Fetched,
}

/// Result of a lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupOutcome {
    /// The page exists. `quotes` may be empty when the page has no
    /// recognisable quote section.
    Found {
        quotes: QuoteList,
        source: LookupSource,
    },
    /// No page for this subject, or the fetch failed or timed out
    NotFound,
}

impl LookupOutcome {
    /// Quotes of a found page; empty for `NotFound`
    pub fn quotes(&self) -> &[Quote] {
        match self {
            LookupOutcome::Found { quotes, .. } => quotes,
            LookupOutcome::NotFound => &[],
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found { .. })
    }

    pub fn is_cache_hit(&self) -> bool {
        matches!(
            self,
            LookupOutcome::Found {
                source: LookupSource::CacheHit { .. },
                ..
            }
        )
    }

    fn hit(entry: Arc<CachedQuotes>) -> Self {
        LookupOutcome::Found {
            quotes: entry.quotes.clone(),
            source: LookupSource::CacheHit {
                fetched_at: entry.fetched_at,
            },
        }
    }
}

/// Settings for the orchestrator
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// Page root the subject is appended to
    pub base_url: String,

    /// Upper bound on a single fetch; expiry is treated as not found
    pub fetch_timeout: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&AppConfig> for LookupConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            fetch_timeout: config.fetch_timeout,
        }
    }
}

/// Outcome slot shared by every lookup waiting on the same fetch
type Flight = Arc<OnceCell<LookupOutcome>>;

/// Quote lookup service: cache in front of fetch + extract
///
/// Concurrent lookups for the same key share one fetch. The first lookup
/// to miss opens a flight for the key; lookups arriving while it runs wait
/// on the flight and receive its outcome, including `NotFound`, without
/// fetching again.
#[derive(Debug)]
pub struct QuoteSearch {
    config: LookupConfig,
    cache: Mutex<QuoteCache>,
    fetcher: Arc<dyn DocumentFetcher>,
    in_flight: StdMutex<HashMap<CacheKey, Flight>>,
}

impl QuoteSearch {
    /// Create a lookup service around an existing cache and fetcher
    pub fn new(config: LookupConfig, cache: QuoteCache, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self {
            config,
            cache: Mutex::new(cache),
            fetcher,
            in_flight: StdMutex::new(HashMap::new()),
        }
    }

    /// Wire up the HTTP fetcher and a fresh cache from application config
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::new(config.fetch_timeout, &config.user_agent)?;

        Ok(Self::new(
            LookupConfig::from(config),
            QuoteCache::new(config.cache_config()),
            Arc::new(fetcher),
        ))
    }

    /// Look up the quotes for a full query such as `!wq search oscar wilde`
    ///
    /// Fails only when the query names no subject. Fetch problems are
    /// reported as [`LookupOutcome::NotFound`].
    pub async fn lookup(&self, query: &str) -> Result<LookupOutcome> {
        let request_id = Uuid::new_v4();
        let span = info_span!("lookup", %request_id, query = %query.trim());

        async move {
            let url = page_url(&self.config.base_url, query)?;

            let cached = self.cache.lock().await.get_entry(query);
            if let Some(entry) = cached {
                return Ok(LookupOutcome::hit(entry));
            }

            let flight = self.join_flight(CacheKey::normalize(query));
            let outcome = flight
                .slot
                .get_or_init(|| async {
                    // A flight that finished just before this one opened may
                    // already have filled the cache.
                    let cached = self.cache.lock().await.peek_entry(query);
                    match cached {
                        Some(entry) => {
                            debug!("Served by a concurrent lookup");
                            LookupOutcome::hit(entry)
                        }
                        None => self.fetch_and_store(query, &url).await,
                    }
                })
                .await
                .clone();

            Ok(outcome)
        }
        .instrument(span)
        .await
    }

    /// Current cache statistics
    pub async fn stats(&self) -> CacheStats {
        self.cache.lock().await.stats()
    }

    /// Number of cached lookups
    pub async fn cached_len(&self) -> usize {
        self.cache.lock().await.len()
    }

    async fn fetch_and_store(&self, query: &str, url: &str) -> LookupOutcome {
        info!("Fetching {}", url);
        let fetched = tokio::time::timeout(self.config.fetch_timeout, self.fetcher.fetch_document(url)).await;

        let document = match fetched {
            Ok(Ok(FetchOutcome::Document(text))) => text,
            Ok(Ok(FetchOutcome::NotFound)) => {
                info!("No page at {}", url);
                return LookupOutcome::NotFound;
            }
            Ok(Err(e)) => {
                warn!("Fetch failed for {}: {}", url, e);
                return LookupOutcome::NotFound;
            }
            Err(_) => {
                let e = SearchError::TimeoutError {
                    timeout_seconds: self.config.fetch_timeout.as_secs(),
                    context: format!("fetch {}", url),
                };
                warn!("{}", e);
                return LookupOutcome::NotFound;
            }
        };

        let quotes = extract_quotes(&document);
        info!("Extracted {} quotes from {}", quotes.len(), url);

        self.cache.lock().await.put(query, quotes.clone());

        LookupOutcome::Found {
            quotes,
            source: LookupSource::Fetched,
        }
    }

    fn join_flight(&self, key: CacheKey) -> FlightGuard<'_> {
        let slot = lock_flights(&self.in_flight).entry(key.clone()).or_default().clone();

        FlightGuard {
            flights: &self.in_flight,
            key,
            slot,
        }
    }
}

fn lock_flights(flights: &StdMutex<HashMap<CacheKey, Flight>>) -> MutexGuard<'_, HashMap<CacheKey, Flight>> {
    flights.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A lookup's membership in a flight
///
/// Dropping the guard, on completion or cancellation, retires the flight
/// once it has an outcome or no other lookup is attached to it.
struct FlightGuard<'a> {
    flights: &'a StdMutex<HashMap<CacheKey, Flight>>,
    key: CacheKey,
    slot: Flight,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let mut flights = lock_flights(self.flights);
        let Some(current) = flights.get(&self.key) else {
            return;
        };

        // Two references: the map's and ours.
        let unattended = Arc::strong_count(&self.slot) <= 2;
        if Arc::ptr_eq(current, &self.slot) && (self.slot.initialized() || unattended) {
            flights.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PAGE: &str = r#"<h2><span class="mw-headline" id="Quotes">Quotes</span></h2>
<ul><li>Only quote</li></ul>"#;

    #[derive(Debug)]
    struct FixedFetcher {
        outcome: FetchOutcome,
        calls: AtomicUsize,
        urls: std::sync::Mutex<Vec<String>>,
    }

    impl FixedFetcher {
        fn new(outcome: FetchOutcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: AtomicUsize::new(0),
                urls: std::sync::Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl DocumentFetcher for FixedFetcher {
        async fn fetch_document(&self, url: &str) -> Result<FetchOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_string());
            Ok(self.outcome.clone())
        }
    }

    fn search_with(fetcher: Arc<FixedFetcher>) -> QuoteSearch {
        let config = LookupConfig {
            base_url: "http://wiki.test/wiki/".to_string(),
            fetch_timeout: Duration::from_secs(1),
        };
        QuoteSearch::new(config, QuoteCache::with_capacity(4), fetcher)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let fetcher = FixedFetcher::new(FetchOutcome::Document(PAGE.to_string()));
        let search = search_with(fetcher.clone());

        let first = search.lookup("!wq search oscar wilde").await.unwrap();
        assert_eq!(first.quotes(), ["Only quote".to_string()]);
        assert!(!first.is_cache_hit());

        let second = search.lookup("!WQ SEARCH Oscar Wilde").await.unwrap();
        assert!(second.is_cache_hit());
        assert_eq!(second.quotes(), first.quotes());

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            fetcher.urls.lock().unwrap().as_slice(),
            ["http://wiki.test/wiki/Oscar_Wilde".to_string()]
        );
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let fetcher = FixedFetcher::new(FetchOutcome::NotFound);
        let search = search_with(fetcher.clone());

        assert_eq!(search.lookup("!wq search nobody").await.unwrap(), LookupOutcome::NotFound);
        assert_eq!(search.lookup("!wq search nobody").await.unwrap(), LookupOutcome::NotFound);

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
        assert_eq!(search.cached_len().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_query_skips_fetch() {
        let fetcher = FixedFetcher::new(FetchOutcome::Document(PAGE.to_string()));
        let search = search_with(fetcher.clone());

        let result = search.lookup("!wq search").await;
        assert!(matches!(result, Err(SearchError::InvalidQuery(_))));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_flights_are_retired() {
        let fetcher = FixedFetcher::new(FetchOutcome::Document(PAGE.to_string()));
        let search = search_with(fetcher);

        search.lookup("!wq search a").await.unwrap();
        search.lookup("!wq search b").await.unwrap();
        assert!(lock_flights(&search.in_flight).is_empty());
    }

    #[derive(Debug)]
    struct StalledFetcher;

    #[async_trait]
    impl DocumentFetcher for StalledFetcher {
        async fn fetch_document(&self, _url: &str) -> Result<FetchOutcome> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(FetchOutcome::NotFound)
        }
    }

    #[tokio::test]
    async fn test_cancelled_lookup_retires_flight() {
        let config = LookupConfig {
            base_url: "http://wiki.test/wiki/".to_string(),
            fetch_timeout: Duration::from_secs(60),
        };
        let search = QuoteSearch::new(config, QuoteCache::with_capacity(4), Arc::new(StalledFetcher));

        let cancelled = tokio::time::timeout(Duration::from_millis(20), search.lookup("!wq search a")).await;
        assert!(cancelled.is_err());
        assert!(lock_flights(&search.in_flight).is_empty());
    }

    #[tokio::test]
    async fn test_cold_lookup_counts_one_miss() {
        let fetcher = FixedFetcher::new(FetchOutcome::Document(PAGE.to_string()));
        let search = search_with(fetcher);

        search.lookup("!wq search a").await.unwrap();
        let stats = search.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);

        search.lookup("!wq search a").await.unwrap();
        let stats = search.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);

        let _ = search.lookup("!wq search").await;
        assert_eq!(search.stats().await.misses, 1);
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = LookupOutcome::Found {
            quotes: vec!["q".to_string()],
            source: LookupSource::Fetched,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "found");
        assert_eq!(json["source"]["kind"], "fetched");

        let json = serde_json::to_value(LookupOutcome::NotFound).unwrap();
        assert_eq!(json["status"], "not_found");
    }
}
