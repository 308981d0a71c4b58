use crate::index::{Article, TokenSet};
use crate::sources::{document, NewsSource};
use crate::{SourceError, SourceResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::thread;
use std::time::Duration;

/// [`NewsSource`] serving canned feed lists, feeds and article bodies
///
/// Unknown locations fail with the matching [`SourceError`]. Every article
/// fetch is counted so tests can check that no URL was fetched twice.
///
/// # Example
///
/// ```
/// use news_aggregator::{Article, MemorySource, NewsSource};
///
/// let source = MemorySource::new()
///     .with_feed_list("feeds", [("Wire", "mem://wire/feed")])
///     .with_feed("mem://wire/feed", vec![Article::new("Hello", "mem://wire/1")])
///     .with_document("mem://wire/1", "hello world");
///
/// assert_eq!(source.fetch_feed_list("feeds").unwrap().len(), 1);
/// assert!(source.fetch_tokens("mem://wire/1").unwrap().contains("world"));
/// assert_eq!(source.fetch_count("mem://wire/1"), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemorySource {
    feed_lists: HashMap<String, Vec<(String, String)>>,
    feeds: HashMap<String, Vec<Article>>,
    documents: HashMap<String, String>,
    latency: Option<Duration>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a feed list at `uri` listing `(name, url)` pairs in order
    pub fn with_feed_list<I, N, U>(mut self, uri: &str, feeds: I) -> Self
    where
        I: IntoIterator<Item = (N, U)>,
        N: Into<String>,
        U: Into<String>,
    {
        let feeds = feeds
            .into_iter()
            .map(|(name, url)| (name.into(), url.into()))
            .collect();
        self.feed_lists.insert(uri.to_string(), feeds);
        self
    }

    /// Registers a feed at `url` listing `articles`
    pub fn with_feed(mut self, url: &str, articles: Vec<Article>) -> Self {
        self.feeds.insert(url.to_string(), articles);
        self
    }

    /// Registers an article at `url` whose body text is `text`
    pub fn with_document(mut self, url: &str, text: &str) -> Self {
        self.documents.insert(url.to_string(), text.to_string());
        self
    }

    /// Makes every article fetch sleep for `latency` first
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// How many times the article at `url` has been fetched
    pub fn fetch_count(&self, url: &str) -> usize {
        self.fetches.lock().get(url).copied().unwrap_or(0)
    }

    /// Total article fetches across all URLs
    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().values().sum()
    }
}

impl NewsSource for MemorySource {
    fn fetch_feed_list(&self, uri: &str) -> SourceResult<Vec<(String, String)>> {
        self.feed_lists
            .get(uri)
            .cloned()
            .ok_or_else(|| SourceError::FeedListUnparseable {
                uri: uri.to_string(),
                reason: "no such feed list".to_string(),
            })
    }

    fn fetch_feed(&self, url: &str) -> SourceResult<Vec<Article>> {
        self.feeds
            .get(url)
            .cloned()
            .ok_or_else(|| SourceError::FeedUnparseable {
                url: url.to_string(),
                reason: "no such feed".to_string(),
            })
    }

    fn fetch_tokens(&self, url: &str) -> SourceResult<TokenSet> {
        *self.fetches.lock().entry(url.to_string()).or_insert(0) += 1;
        if let Some(latency) = self.latency {
            thread::sleep(latency);
        }

        self.documents
            .get(url)
            .map(|text| document::tokenize(text))
            .ok_or_else(|| SourceError::DocumentUnparseable {
                url: url.to_string(),
                reason: "no such document".to_string(),
            })
    }
}
