//! Fetching raw Wikiquote pages
//!
//! The orchestrator only needs to know whether a page exists and, if so,
//! its text. [`DocumentFetcher`] is the seam; [`HttpFetcher`] is the real
//! implementation and tests plug in their own.

use crate::error::{Result, SearchError};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

/// Page root used when no other base is configured
pub const DEFAULT_BASE_URL: &str = "https://en.wikiquote.org/wiki/";

/// Number of leading query tokens reserved for the command keyword and
/// sub-keyword (`!wq search`)
pub const RESERVED_TOKENS: usize = 2;

/// Result of asking for a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page exists; its raw text
    Document(String),
    /// The page does not exist (any non-200 answer)
    NotFound,
}

/// Source of raw page text
#[async_trait]
pub trait DocumentFetcher: Send + Sync + std::fmt::Debug {
    async fn fetch_document(&self, url: &str) -> Result<FetchOutcome>;
}

/// Fetcher backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch_document(&self, url: &str) -> Result<FetchOutcome> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status != StatusCode::OK {
            warn!("Page not available ({}): {}", status, url);
            return Ok(FetchOutcome::NotFound);
        }

        let body = response.text().await?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(FetchOutcome::Document(body))
    }
}

/// Build the page URL for a query
///
/// The query is split on whitespace, the first [`RESERVED_TOKENS`] tokens
/// are dropped, and the rest are title-cased and joined with `_`:
/// `!wq search oscar WILDE` becomes `<base>Oscar_Wilde`.
pub fn page_url(base_url: &str, query: &str) -> Result<String> {
    let subject: Vec<String> = query
        .split_whitespace()
        .skip(RESERVED_TOKENS)
        .map(title_case)
        .collect();

    if subject.is_empty() {
        return Err(SearchError::InvalidQuery(format!(
            "no subject given in '{}'",
            query.trim()
        )));
    }

    Ok(format!("{}{}", base_url, subject.join("_")))
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url_title_cases_subject() {
        let url = page_url(DEFAULT_BASE_URL, "!wq search oscar WILDE").unwrap();
        assert_eq!(url, "https://en.wikiquote.org/wiki/Oscar_Wilde");
    }

    #[test]
    fn test_page_url_single_word() {
        let url = page_url("http://localhost/wiki/", "cmd search friendship").unwrap();
        assert_eq!(url, "http://localhost/wiki/Friendship");
    }

    #[test]
    fn test_page_url_collapses_extra_whitespace() {
        let url = page_url("/", "!wq   search  martin   luther king").unwrap();
        assert_eq!(url, "/Martin_Luther_King");
    }

    #[test]
    fn test_page_url_requires_subject() {
        assert!(matches!(page_url("/", "!wq search"), Err(SearchError::InvalidQuery(_))));
        assert!(matches!(page_url("/", "   "), Err(SearchError::InvalidQuery(_))));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("oSCAR"), "Oscar");
        assert_eq!(title_case("émile"), "Émile");
        assert_eq!(title_case("x"), "X");
    }
}
