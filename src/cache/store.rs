//! Quote cache: a key index over the recency list

use crate::cache::{
    config::CacheConfig,
    list::{NodeId, RecencyList},
    types::{CacheKey, CacheStats, CachedQuotes, QuoteList},
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Bounded LRU cache of quote lists keyed by case-folded query
///
/// `get` and `put` are O(1): the index maps each key to its node in the
/// recency list, and the list evicts from its tail. The index and the list
/// always hold the same set of keys.
///
/// The cache does no locking of its own. Share it behind a mutex (the
/// lookup orchestrator does) when more than one task can reach it.
#[derive(Debug)]
pub struct QuoteCache {
    config: CacheConfig,
    index: HashMap<CacheKey, NodeId>,
    list: RecencyList<CacheKey, Arc<CachedQuotes>>,
    stats: CacheStats,
}

impl QuoteCache {
    /// Create a new cache with the given configuration
    ///
    /// A zero capacity is raised to one so the cache stays total.
    pub fn new(config: CacheConfig) -> Self {
        let mut config = config;
        if let Err(e) = config.validate() {
            warn!("Invalid cache config ({}), using capacity 1", e);
            config.capacity = 1;
        }
        info!("Initializing quote cache with capacity {}", config.capacity);

        Self {
            index: HashMap::with_capacity(config.capacity + 1),
            list: RecencyList::new(config.capacity),
            stats: CacheStats::default(),
            config,
        }
    }

    /// Create a cache holding at most `capacity` lookups
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(CacheConfig::builder().capacity(capacity).build())
    }

    /// Look up the quotes for `query`, promoting the entry on a hit
    pub fn get(&mut self, query: &str) -> Option<QuoteList> {
        self.get_entry(query).map(|entry| entry.quotes.clone())
    }

    /// Same as [`get`](Self::get) but hands out the shared entry with its
    /// fetch timestamp instead of cloning the list
    pub fn get_entry(&mut self, query: &str) -> Option<Arc<CachedQuotes>> {
        let key = CacheKey::normalize(query);

        let Some(&id) = self.index.get(&key) else {
            debug!("Cache miss: {}", key);
            if self.config.enable_metrics {
                self.stats.misses += 1;
            }
            return None;
        };

        self.list.move_to_head(id);
        if self.config.enable_metrics {
            self.stats.hits += 1;
        }
        debug!("Cache hit: {}", key);
        self.list.value(id).cloned()
    }

    /// Same as [`get_entry`](Self::get_entry) but leaves the hit/miss
    /// counters alone; used to re-check a key whose miss was already counted
    pub fn peek_entry(&mut self, query: &str) -> Option<Arc<CachedQuotes>> {
        let key = CacheKey::normalize(query);
        let &id = self.index.get(&key)?;

        self.list.move_to_head(id);
        self.list.value(id).cloned()
    }

    /// Store the quotes for `query` as the most recently used entry
    ///
    /// An existing key is refreshed in place and promoted rather than
    /// duplicated. A new key that pushes the cache over capacity evicts the
    /// least recently used entry in the same call.
    pub fn put(&mut self, query: &str, quotes: QuoteList) {
        let key = CacheKey::normalize(query);
        let entry = Arc::new(CachedQuotes::new(quotes));

        if let Some(&id) = self.index.get(&key) {
            debug!("Refreshing cache entry: {}", key);
            if let Some(value) = self.list.value_mut(id) {
                *value = entry;
            }
            self.list.move_to_head(id);
            if self.config.enable_metrics {
                self.stats.refreshes += 1;
            }
            return;
        }

        debug!("Inserting cache entry: {}", key);
        let (id, evicted) = self.list.add_head(key.clone(), entry);
        if let Some((evicted_key, _)) = evicted {
            debug!("Evicting least recently used entry: {}", evicted_key);
            self.index.remove(&evicted_key);
            if self.config.enable_metrics {
                self.stats.evictions += 1;
            }
        }
        self.index.insert(key, id);

        if self.config.enable_metrics {
            self.stats.inserts += 1;
        }
    }

    /// Alias for [`get`](Self::get)
    pub fn retrieve(&mut self, query: &str) -> Option<QuoteList> {
        self.get(query)
    }

    /// Alias for [`put`](Self::put)
    pub fn add(&mut self, query: &str, quotes: QuoteList) {
        self.put(query, quotes)
    }

    /// Check if a query is cached (without touching recency)
    pub fn contains(&self, query: &str) -> bool {
        self.index.contains_key(&CacheKey::normalize(query))
    }

    /// Get number of entries in cache
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.list.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.list.capacity()
    }

    /// Keys from most to least recently used
    pub fn keys_by_recency(&self) -> Vec<CacheKey> {
        self.list.iter().map(|(key, _)| key.clone()).collect()
    }

    /// The key that the next overflowing insert would evict
    pub fn least_recent(&self) -> Option<&CacheKey> {
        self.list.tail().and_then(|id| self.list.key(id))
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            ..self.stats.clone()
        }
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
