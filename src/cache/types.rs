//! Core type definitions for the quote cache

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single sanitized quote
pub type Quote = String;

/// Quotes in document order
pub type QuoteList = Vec<Quote>;

/// Case-folded cache key
///
/// Built only through [`CacheKey::normalize`], so two queries that differ
/// only in letter case always produce the same key. The whole query is
/// folded, command keywords included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Normalize a raw query into a cache key
    pub fn normalize(query: &str) -> Self {
        Self(query.to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(query: &str) -> Self {
        Self::normalize(query)
    }
}

/// Quotes stored for one key, stamped with when they were fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedQuotes {
    pub quotes: QuoteList,
    pub fetched_at: DateTime<Utc>,
}

impl CachedQuotes {
    pub fn new(quotes: QuoteList) -> Self {
        Self {
            quotes,
            fetched_at: Utc::now(),
        }
    }
}

/// Counters for cache behaviour
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of cache hits
    pub hits: u64,

    /// Total number of cache misses
    pub misses: u64,

    /// Number of new keys inserted
    pub inserts: u64,

    /// Number of `put` calls that refreshed an existing key
    pub refreshes: u64,

    /// Number of entries evicted from the tail
    pub evictions: u64,

    /// Number of entries currently in cache
    pub entries: usize,
}

impl CacheStats {
    /// Calculate cache hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    /// Calculate miss rate as a percentage
    pub fn miss_rate(&self) -> f64 {
        100.0 - self.hit_rate()
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ hits: {}, misses: {}, hit_rate: {:.2}%, entries: {}, evictions: {} }}",
            self.hits,
            self.misses,
            self.hit_rate(),
            self.entries,
            self.evictions
        )
    }
}
