//! # Quote Extraction
//!
//! Pulls quotes out of a raw Wikiquote page without building a DOM. The page
//! is scanned line by line:
//!
//! - [`classify`] decides what a line is (quote-section heading, other
//!   heading, body) and counts its list tags
//! - [`sanitize`] turns a candidate line into plain quote text
//! - [`machine`] drives the `Seeking → InSection → Done` state machine
//!
//! ```rust
//! use wikiquote_search::extract::extract_quotes;
//!
//! let page = r#"<h2><span class="mw-headline" id="Quotes">Quotes</span></h2>
//! <ul><li>Be yourself; everyone else is already taken.
//! <ul><li>Attributed, source unknown</li></ul></li>
//! </ul>"#;
//!
//! assert_eq!(extract_quotes(page), vec!["Be yourself; everyone else is already taken."]);
//! ```

pub mod classify;
pub mod machine;
pub mod sanitize;

pub use classify::LineKind;
pub use machine::{extract_quotes, ExtractionState, QuoteExtractor};
pub use sanitize::{accept_quote, sanitize_quote, MAX_QUOTE_CHARS};
