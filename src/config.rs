//! Application configuration
//!
//! Values come from the environment (and a `.env` file, if present) and are
//! read once at startup. Every setting has a default, so an empty
//! environment is a valid configuration.

use crate::cache::{CacheConfig, DEFAULT_CAPACITY};
use crate::error::{Result, SearchError};
use crate::fetch::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const ENV_BASE_URL: &str = "WIKIQUOTE_BASE_URL";
pub const ENV_CACHE_CAPACITY: &str = "WIKIQUOTE_CACHE_CAPACITY";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "WIKIQUOTE_FETCH_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "WIKIQUOTE_USER_AGENT";
pub const ENV_COMMAND_PREFIX: &str = "WIKIQUOTE_COMMAND_PREFIX";

/// Top-level configuration for the lookup service and the chat front end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Page root; the title-cased subject is appended to it
    pub base_url: String,

    /// Number of lookups kept in the cache
    pub cache_capacity: usize,

    /// Upper bound on one page fetch; expiry counts as "not found"
    pub fetch_timeout: Duration,

    /// User-Agent sent with every fetch
    pub user_agent: String,

    /// Prefix that marks a chat message as a bot command
    pub command_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_capacity: DEFAULT_CAPACITY,
            fetch_timeout: Duration::from_secs(10),
            user_agent: concat!("wikiquote-search/", env!("CARGO_PKG_VERSION")).to_string(),
            command_prefix: "!wq".to_string(),
        }
    }
}

impl AppConfig {
    /// Create a new builder for application configuration
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load from the process environment, reading `.env` first if present
    pub fn from_env() -> Result<Self> {
        match dotenv::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) => debug!("No .env file loaded: {}", e),
        }

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            builder = builder.base_url(base_url);
        }
        if let Some(raw) = lookup(ENV_CACHE_CAPACITY) {
            builder = builder.cache_capacity(parse_number(ENV_CACHE_CAPACITY, &raw)?);
        }
        if let Some(raw) = lookup(ENV_FETCH_TIMEOUT_SECS) {
            builder = builder.fetch_timeout(Duration::from_secs(parse_number(ENV_FETCH_TIMEOUT_SECS, &raw)?));
        }
        if let Some(user_agent) = lookup(ENV_USER_AGENT) {
            builder = builder.user_agent(user_agent);
        }
        if let Some(prefix) = lookup(ENV_COMMAND_PREFIX) {
            builder = builder.command_prefix(prefix);
        }

        let config = builder.build();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(SearchError::ConfigError(
                "cache_capacity must be greater than 0".to_string(),
            ));
        }

        if self.fetch_timeout.is_zero() {
            return Err(SearchError::ConfigError(
                "fetch_timeout must be greater than 0".to_string(),
            ));
        }

        if !self.base_url.ends_with('/') {
            return Err(SearchError::ConfigError(format!(
                "base_url must end with '/': {}",
                self.base_url
            )));
        }

        if self.command_prefix.trim().is_empty() || self.command_prefix.contains(char::is_whitespace) {
            return Err(SearchError::ConfigError(format!(
                "command_prefix must be a single non-empty word: '{}'",
                self.command_prefix
            )));
        }

        Ok(())
    }

    /// Cache settings derived from this configuration
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::builder().capacity(self.cache_capacity).build()
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| SearchError::ConfigError(format!("{} must be a non-negative integer, got '{}'", name, raw)))
}

/// Builder for application configuration
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    base_url: Option<String>,
    cache_capacity: Option<usize>,
    fetch_timeout: Option<Duration>,
    user_agent: Option<String>,
    command_prefix: Option<String>,
}

impl AppConfigBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn command_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.command_prefix = Some(prefix.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> AppConfig {
        let defaults = AppConfig::default();

        AppConfig {
            base_url: self.base_url.unwrap_or(defaults.base_url),
            cache_capacity: self.cache_capacity.unwrap_or(defaults.cache_capacity),
            fetch_timeout: self.fetch_timeout.unwrap_or(defaults.fetch_timeout),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
            command_prefix: self.command_prefix.unwrap_or(defaults.command_prefix),
        }
    }
}
