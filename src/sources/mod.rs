//! Feed list, feed and article collaborators
//!
//! The crawl core only talks to a [`NewsSource`]. Two implementations are
//! provided:
//! - [`HttpSource`]: fetches over HTTP (or from disk) and parses real RSS,
//!   Atom and HTML
//! - [`MemorySource`]: serves canned data, for tests and demos

mod document;
mod feed;
mod http;
mod memory;

pub use document::{extract_text, tokenize};
pub use feed::{parse_feed, parse_feed_list, FeedItem};
pub use http::HttpSource;
pub use memory::MemorySource;

use crate::index::{Article, TokenSet};
use crate::SourceResult;

/// Everything a crawl needs from the outside world
///
/// Implementations are shared by every crawl thread at once, so they must be
/// `Send + Sync`. Failures are reported as [`SourceError`](crate::SourceError)
/// values and never abort a crawl.
pub trait NewsSource: Send + Sync {
    /// Loads the feed list at `uri`
    ///
    /// # Returns
    ///
    /// * `Ok(feeds)` - `(name, url)` pairs in list order; names need not be unique
    /// * `Err(SourceError::FeedListUnparseable)` - The list could not be loaded
    fn fetch_feed_list(&self, uri: &str) -> SourceResult<Vec<(String, String)>>;

    /// Loads one feed and returns its articles in document order
    fn fetch_feed(&self, url: &str) -> SourceResult<Vec<Article>>;

    /// Loads one article and returns the tokens of its body text
    fn fetch_tokens(&self, url: &str) -> SourceResult<TokenSet>;
}
