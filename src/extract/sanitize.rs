//! Turning one line of list markup into clean quote text

#![allow(clippy::expect_used)]

use crate::cache::Quote;
use regex::Regex;
use std::sync::LazyLock;

/// Longest quote kept, in characters. Longer candidates are dropped whole.
pub const MAX_QUOTE_CHARS: usize = 2000;

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("LINE_BREAK regex"));

/// Any tag, including one left open at the end of the line.
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[^>]+(?:>|$)").expect("TAG regex"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("WHITESPACE_RUN regex"));

/// Character references decoded after tags are stripped. `&amp;` stays last
/// so an escaped reference such as `&amp;#160;` is not decoded twice.
const CHARACTER_REFERENCES: &[(&str, &str)] = &[
    ("&#8212;", "--"),
    ("&mdash;", "--"),
    ("&#8211;", "-"),
    ("&ndash;", "-"),
    ("&#160;", " "),
    ("&nbsp;", " "),
    ("&#8205;", ""),
    ("&#8220;", "'"),
    ("&#8221;", "'"),
    ("&#8216;", "'"),
    ("&#8217;", "'"),
    ("&#39;", "'"),
    ("&quot;", "'"),
    ("&amp;", "&"),
];

const QUOTATION_GLYPHS: &[char] = &['"', '\u{201C}', '\u{201D}', '\u{201E}', '\u{201F}', '\u{2018}', '\u{2019}', '\u{201A}', '\u{201B}'];

/// Plain glyph every quotation mark is folded to
pub const PLAIN_QUOTE: char = '\'';

/// Strip markup from a line and normalize its text
///
/// Line breaks survive as `\n`; everything else is flattened to single
/// spaces and trimmed. The result may be empty.
pub fn sanitize_quote(line: &str) -> String {
    let text = LINE_BREAK.replace_all(line, "\n");
    let text = TAG.replace_all(&text, "");

    let mut text = text.into_owned();
    for (reference, literal) in CHARACTER_REFERENCES {
        if text.contains(reference) {
            text = text.replace(reference, literal);
        }
    }

    let text: String = text
        .chars()
        .map(|c| if QUOTATION_GLYPHS.contains(&c) { PLAIN_QUOTE } else { c })
        .collect();

    WHITESPACE_RUN.replace_all(&text, " ").trim().to_string()
}

/// Sanitize a candidate line and keep it only if it makes a usable quote
pub fn accept_quote(line: &str) -> Option<Quote> {
    let quote = sanitize_quote(line);
    if quote.is_empty() || quote.chars().count() > MAX_QUOTE_CHARS {
        None
    } else {
        Some(quote)
    }
}
