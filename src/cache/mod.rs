//! # Quote Cache
//!
//! A fixed-capacity, least-recently-used cache for lookup results. Fetching
//! and scraping a page is slow; the cache remembers the quote lists of the
//! most recent lookups so repeated queries are answered from memory.
//!
//! ## Features
//!
//! - **O(1) get/put**: a hash index over an arena-backed doubly-linked list
//! - **LRU eviction**: inserting past capacity drops the least recently used entry
//! - **Case-insensitive keys**: queries are upper-cased before use
//! - **Refresh on re-insert**: `put` on a known key replaces and promotes it
//!
//! ## Example
//!
//! ```rust
//! use wikiquote_search::cache::{CacheConfig, QuoteCache};
//!
//! let config = CacheConfig::builder().capacity(2).build();
//! let mut cache = QuoteCache::new(config);
//!
//! cache.put("Oscar Wilde", vec!["Be yourself; everyone else is already taken.".to_string()]);
//!
//! if let Some(quotes) = cache.get("oscar wilde") {
//!     println!("Cache hit: {} quotes", quotes.len());
//! }
//! ```

pub mod config;
mod list;
pub mod store;
pub mod types;

pub use config::{CacheConfig, CacheConfigBuilder, DEFAULT_CAPACITY};
pub use store::QuoteCache;
pub use types::{CacheKey, CacheStats, CachedQuotes, Quote, QuoteList};
