//! # wikiquote-search
//!
//! Quote lookup against Wikiquote with an in-memory recency cache.
//!
//! ## Features
//!
//! - Bounded least-recently-used cache keyed by the case-insensitive query
//! - Streaming, line-based quote extraction (no DOM)
//! - Async lookup with fetch timeout and per-key fetch sharing
//! - Chat-bot front end (`!wq search <subject>`)
//!
//! ## Lookup
//!
//! ```no_run
//! use wikiquote_search::{AppConfig, LookupOutcome, QuoteSearch};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let search = QuoteSearch::from_app_config(&AppConfig::default())?;
//!
//!     match search.lookup("!wq search oscar wilde").await? {
//!         LookupOutcome::Found { quotes, .. } => println!("{} quotes", quotes.len()),
//!         LookupOutcome::NotFound => println!("no such page"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Chat
//!
//! ```no_run
//! use wikiquote_search::{AppConfig, ChatBot, QuoteSearch};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let bot = ChatBot::new(QuoteSearch::from_app_config(&config)?, &config.command_prefix);
//!
//!     if let Some(reply) = bot.respond("!wq search friendship").await {
//!         println!("{}", reply);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod chat;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod lookup;

pub use cache::{CacheConfig, CacheKey, CacheStats, CachedQuotes, Quote, QuoteCache, QuoteList};
pub use chat::{ChatBot, ChatCommand, FirstPicker, QuotePicker, RandomPicker};
pub use config::AppConfig;
pub use error::{Result, SearchError};
pub use extract::extract_quotes;
pub use fetch::{page_url, DocumentFetcher, FetchOutcome, HttpFetcher};
pub use lookup::{LookupConfig, LookupOutcome, LookupSource, QuoteSearch};
