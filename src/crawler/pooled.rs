use crate::concurrency::WorkerPool;
use crate::config::PoolConfig;
use crate::crawler::{CrawlContext, CrawlOrchestrator, CrawlReport};
use crate::index::ArticleIndexer;
use crate::sources::NewsSource;
use crate::Result;
use std::sync::Arc;

/// Crawls with two fixed pools of reusable worker threads
///
/// Feed tasks run on the feed pool; each one schedules an article task per
/// unclaimed article on the (larger) article pool. The total number of crawl
/// threads never exceeds `feed_workers + article_workers` plus one dispatcher
/// per pool.
pub struct PooledOrchestrator {
    source: Arc<dyn NewsSource>,
    indexer: Arc<ArticleIndexer>,
    feed_list_uri: String,
    feed_workers: usize,
    article_workers: usize,
}

impl PooledOrchestrator {
    /// # Arguments
    ///
    /// * `source` - Where feeds and articles come from
    /// * `indexer` - The index every article is added to
    /// * `feed_list_uri` - Location of the feed list
    /// * `pool` - Worker counts for the feed and article pools
    pub fn new(
        source: Arc<dyn NewsSource>,
        indexer: Arc<ArticleIndexer>,
        feed_list_uri: impl Into<String>,
        pool: &PoolConfig,
    ) -> Self {
        Self {
            source,
            indexer,
            feed_list_uri: feed_list_uri.into(),
            feed_workers: pool.feed_workers,
            article_workers: pool.article_workers,
        }
    }
}

impl CrawlOrchestrator for PooledOrchestrator {
    fn name(&self) -> &'static str {
        "pooled"
    }

    fn run(&self) -> Result<CrawlReport> {
        let context = Arc::new(CrawlContext::new(
            Arc::clone(&self.source),
            Arc::clone(&self.indexer),
            self.feed_list_uri.clone(),
        ));

        let feed_pool = WorkerPool::new("feed", self.feed_workers)?;
        let article_pool = WorkerPool::new("article", self.article_workers)?;
        tracing::info!(
            "Crawling with {} feed workers and {} article workers",
            feed_pool.size(),
            article_pool.size()
        );

        for (name, url) in context.load_feeds() {
            let context = Arc::clone(&context);
            let articles = article_pool.handle();
            feed_pool.schedule(move || {
                for article in context.load_articles(&name, &url) {
                    if !context.claim(&article) {
                        continue;
                    }
                    let context = Arc::clone(&context);
                    articles.schedule(move || context.process_article(article));
                }
            });
        }

        // Every article task is scheduled by the time the feed pool drains
        feed_pool.wait();
        article_pool.wait();

        let report = context.report(self.name());
        tracing::info!(
            "Pooled crawl finished: {} articles indexed from {} feeds in {:.2}s",
            report.articles_indexed,
            report.feeds,
            report.elapsed.as_secs_f64()
        );
        Ok(report)
    }
}
