//! State and steps shared by both crawl strategies
//!
//! A [`CrawlContext`] lives for exactly one `run()`. It owns the claim set for
//! that run and the progress counters, and borrows the long-lived source and
//! indexer.

use crate::crawler::CrawlReport;
use crate::index::{Article, ArticleIndexer, SeenUrls};
use crate::sources::NewsSource;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Default)]
struct CrawlStats {
    feeds: AtomicUsize,
    feeds_failed: AtomicUsize,
    articles_scheduled: AtomicUsize,
    articles_indexed: AtomicUsize,
    articles_failed: AtomicUsize,
    duplicate_urls_skipped: AtomicUsize,
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::Relaxed);
}

/// Per-run crawl state
pub struct CrawlContext {
    source: Arc<dyn NewsSource>,
    indexer: Arc<ArticleIndexer>,
    seen: SeenUrls,
    feed_list_uri: String,
    stats: CrawlStats,
    started_at: chrono::DateTime<Utc>,
    started: Instant,
}

impl CrawlContext {
    pub fn new(
        source: Arc<dyn NewsSource>,
        indexer: Arc<ArticleIndexer>,
        feed_list_uri: impl Into<String>,
    ) -> Self {
        Self {
            source,
            indexer,
            seen: SeenUrls::new(),
            feed_list_uri: feed_list_uri.into(),
            stats: CrawlStats::default(),
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    /// Loads the feed list as `(name, url)` pairs, one per distinct URL
    ///
    /// An unreadable feed list is logged and treated as empty.
    pub fn load_feeds(&self) -> Vec<(String, String)> {
        let feeds = match self.source.fetch_feed_list(&self.feed_list_uri) {
            Ok(feeds) => feeds,
            Err(e) => {
                tracing::warn!("{}", e);
                return Vec::new();
            }
        };

        let mut urls = HashSet::new();
        let mut unique = Vec::with_capacity(feeds.len());
        for (name, url) in feeds {
            if urls.insert(url.clone()) {
                unique.push((name, url));
            } else {
                tracing::debug!("Feed \"{}\" repeats {}; skipping", name, url);
            }
        }

        tracing::info!("Feed list {} names {} feeds", self.feed_list_uri, unique.len());
        unique
    }

    /// Loads one feed's articles sorted by URL
    ///
    /// An unreadable feed is logged and contributes no articles.
    pub fn load_articles(&self, name: &str, url: &str) -> Vec<Article> {
        bump(&self.stats.feeds);
        tracing::debug!("Fetching feed \"{}\" from {}", name, url);

        match self.source.fetch_feed(url) {
            Ok(mut articles) => {
                articles.sort();
                tracing::debug!("Feed \"{}\" lists {} articles", name, articles.len());
                articles
            }
            Err(e) => {
                bump(&self.stats.feeds_failed);
                tracing::warn!("{}", e);
                Vec::new()
            }
        }
    }

    /// Claims `article` for this run
    ///
    /// Returns `false` when another feed already claimed the same URL.
    pub fn claim(&self, article: &Article) -> bool {
        if self.seen.contains_url(&article.url) {
            bump(&self.stats.duplicate_urls_skipped);
            tracing::trace!("Already claimed: {}", article.url);
            return false;
        }
        bump(&self.stats.articles_scheduled);
        true
    }

    /// Fetches one claimed article and hands its tokens to the indexer
    ///
    /// An unreadable article is logged and leaves the index untouched.
    pub fn process_article(&self, article: Article) {
        tracing::debug!("Fetching article \"{}\" from {}", article.title, article.url);

        match self.source.fetch_tokens(&article.url) {
            Ok(tokens) => {
                self.indexer.update_index(article, tokens);
                bump(&self.stats.articles_indexed);
            }
            Err(e) => {
                bump(&self.stats.articles_failed);
                tracing::debug!("{}", e);
            }
        }
    }

    /// Records a claimed article that will never be fetched
    pub fn abandon_article(&self, url: &str, reason: &str) {
        bump(&self.stats.articles_failed);
        tracing::warn!("Abandoning {}: {}", url, reason);
    }

    /// Summarizes the run so far
    pub fn report(&self, strategy: &'static str) -> CrawlReport {
        tracing::debug!(
            "Index holds {} tokens in {} (token, article) entries",
            self.indexer.token_count(),
            self.indexer.entry_count()
        );
        let load = |counter: &AtomicUsize| counter.load(Ordering::Relaxed);
        CrawlReport {
            strategy,
            feeds: load(&self.stats.feeds),
            feeds_failed: load(&self.stats.feeds_failed),
            articles_scheduled: load(&self.stats.articles_scheduled),
            articles_indexed: load(&self.stats.articles_indexed),
            articles_failed: load(&self.stats.articles_failed),
            duplicate_urls_skipped: load(&self.stats.duplicate_urls_skipped),
            titles: self.indexer.title_count(),
            tokens: self.indexer.token_count(),
            started_at: self.started_at,
            finished_at: Utc::now(),
            elapsed: self.started.elapsed(),
        }
    }
}
