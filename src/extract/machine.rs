//! Line-by-line quote extraction state machine

use crate::cache::QuoteList;
use crate::extract::classify::{self, LineKind};
use crate::extract::sanitize;
use tracing::debug;

/// Where the extractor is within the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionState {
    /// Looking for the first quote-bearing section
    Seeking,
    /// Inside a quote-bearing section
    InSection,
    /// Past the end of the quote sections; remaining lines are ignored
    Done,
}

/// Incremental quote extractor
///
/// Feed lines in document order with [`feed_line`](Self::feed_line), then
/// call [`finish`](Self::finish). Quotes are the top-level items of the
/// section's bullet lists: a line counts when the `<ul>` nesting depth,
/// after the line's own opening tags, is exactly one. Deeper lines (source
/// citations, translations) are skipped.
#[derive(Debug)]
pub struct QuoteExtractor {
    state: ExtractionState,
    depth: usize,
    quotes: QuoteList,
    lines_seen: usize,
}

impl QuoteExtractor {
    pub fn new() -> Self {
        Self {
            state: ExtractionState::Seeking,
            depth: 0,
            quotes: Vec::new(),
            lines_seen: 0,
        }
    }

    pub fn state(&self) -> ExtractionState {
        self.state
    }

    /// Current `<ul>` nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Quotes collected so far
    pub fn quotes(&self) -> &[String] {
        &self.quotes
    }

    /// Process one line and return the resulting state
    pub fn feed_line(&mut self, line: &str) -> ExtractionState {
        self.lines_seen += 1;

        match self.state {
            ExtractionState::Seeking => {
                if classify::is_quotes_header(line) {
                    debug!("Quote section starts at line {}", self.lines_seen);
                    self.state = ExtractionState::InSection;
                }
            }
            ExtractionState::InSection => match classify::classify(line) {
                LineKind::OtherHeader => {
                    debug!("Quote section ends at line {}", self.lines_seen);
                    self.state = ExtractionState::Done;
                }
                LineKind::QuotesHeader => {}
                LineKind::Body => self.scan_body_line(line),
            },
            ExtractionState::Done => {}
        }

        self.state
    }

    /// Consume the extractor and return its quotes in document order
    pub fn finish(self) -> QuoteList {
        self.quotes
    }

    fn scan_body_line(&mut self, line: &str) {
        self.depth += classify::count_list_opens(line);

        if self.depth == 1 {
            if let Some(quote) = sanitize::accept_quote(line) {
                self.quotes.push(quote);
            }
        }

        // Stray closing tags must not wrap the counter.
        self.depth = self.depth.saturating_sub(classify::count_list_closes(line));
    }
}

impl Default for QuoteExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract every quote from a raw page
///
/// Never fails: a page without a recognised quote section, or with broken
/// markup, simply yields fewer (or no) quotes.
pub fn extract_quotes(document: &str) -> QuoteList {
    let mut extractor = QuoteExtractor::new();

    for line in document.lines() {
        if extractor.feed_line(line) == ExtractionState::Done {
            break;
        }
    }

    let quotes = extractor.finish();
    debug!("Extracted {} quotes", quotes.len());
    quotes
}
