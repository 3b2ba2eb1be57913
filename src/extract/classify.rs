//! Line classification for Wikiquote page markup
//!
//! Each predicate looks at one line of raw HTML in isolation. Patterns are
//! compiled once on first use.

#![allow(clippy::expect_used)]

use regex::Regex;
use std::sync::LazyLock;

/// Start of a top-level section heading.
static HEADER_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<h2[\s>]").expect("HEADER_OPEN regex"));

/// Visible title of an `<h2>` heading.
///
/// Handles both the legacy `<h2><span class="mw-headline" id="Quotes">Quotes</span>`
/// form (with optional empty anchor spans before the headline) and the
/// current `<h2 id="Quotes">Quotes</h2>` form.
static HEADING_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<h2[^>]*>\s*(?:<span[^>]*>\s*(?:</span>\s*)?)*([^<]*?)\s*<")
        .expect("HEADING_TITLE regex")
});

static LIST_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<ul(?:\s[^>]*)?>").expect("LIST_OPEN regex"));

static LIST_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</ul\s*>").expect("LIST_CLOSE regex"));

/// What a single line means to the extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Heading of a section that holds quotes
    QuotesHeader,
    /// Any other top-level heading
    OtherHeader,
    /// Everything else
    Body,
}

/// Classify one line
pub fn classify(line: &str) -> LineKind {
    if !is_header(line) {
        LineKind::Body
    } else if is_quotes_header(line) {
        LineKind::QuotesHeader
    } else {
        LineKind::OtherHeader
    }
}

/// The line opens a top-level (`<h2>`) section heading
pub fn is_header(line: &str) -> bool {
    HEADER_OPEN.is_match(line)
}

/// The line is a heading for a quote-bearing section: either the literal
/// `Quotes`, or a single capital letter as used by alphabetised topic pages
pub fn is_quotes_header(line: &str) -> bool {
    heading_title(line).is_some_and(|title| {
        title == "Quotes" || (title.len() == 1 && title.bytes().all(|b| b.is_ascii_uppercase()))
    })
}

/// A heading that ends a quote-bearing section
pub fn is_other_header(line: &str) -> bool {
    is_header(line) && !is_quotes_header(line)
}

/// Title text of the line's `<h2>` heading, if it has one
pub fn heading_title(line: &str) -> Option<&str> {
    HEADING_TITLE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Number of `<ul>` tags on the line
pub fn count_list_opens(line: &str) -> usize {
    LIST_OPEN.find_iter(line).count()
}

/// Number of `</ul>` tags on the line
pub fn count_list_closes(line: &str) -> usize {
    LIST_CLOSE.find_iter(line).count()
}
