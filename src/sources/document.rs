//! Article body extraction and tokenization

use crate::index::TokenSet;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

/// A word starts with a letter and continues with letters, digits,
/// underscores or apostrophes
static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex"));

const SKIPPED_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

/// Extracts the visible text of an HTML document
///
/// Text inside `<script>`, `<style>` and `<noscript>` is dropped. When the
/// document has a `<body>` only its text is used, otherwise the whole
/// document's.
///
/// # Example
///
/// ```
/// use news_aggregator::sources::extract_text;
///
/// let html = "<html><head><title>T</title></head><body><p>Hello</p><script>x()</script></body></html>";
/// assert_eq!(extract_text(html).trim(), "Hello");
/// ```
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next());
    let root = body.unwrap_or_else(|| document.root_element());

    let mut text = String::new();
    for node in root.descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| SKIPPED_ELEMENTS.contains(&element.name()))
        });
        if !hidden {
            text.push_str(fragment);
            text.push(' ');
        }
    }
    text
}

/// Splits text into words, lowercases them and counts repeats
///
/// # Example
///
/// ```
/// use news_aggregator::sources::tokenize;
///
/// let tokens = tokenize("The cat, the HAT.");
/// assert_eq!(tokens.tokens().collect::<Vec<_>>(), vec!["cat", "hat", "the"]);
/// assert_eq!(tokens.count("the"), 2);
/// ```
pub fn tokenize(text: &str) -> TokenSet {
    TokenSet::from_tokens(WORD_RE.find_iter(text).map(|m| m.as_str()))
}
