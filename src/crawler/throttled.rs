use crate::concurrency::{ResourceThrottle, ServerThrottles};
use crate::config::ThrottleConfig;
use crate::crawler::{CrawlContext, CrawlOrchestrator, CrawlReport};
use crate::index::ArticleIndexer;
use crate::sources::NewsSource;
use crate::Result;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Crawls with one short-lived thread per feed and per article
///
/// Three throttles bound the crawl:
/// - `max_threads` crawl threads alive at once, feeds and articles together
/// - `feed_threads` feed threads alive at once
/// - `threads_per_server` article threads per origin server
///
/// Permits are taken before a thread is spawned and move into it, so they are
/// returned when the thread exits however it exits.
pub struct ThrottledOrchestrator {
    source: Arc<dyn NewsSource>,
    indexer: Arc<ArticleIndexer>,
    feed_list_uri: String,
    max_threads: usize,
    feed_threads: usize,
    threads_per_server: usize,
}

/// Throttles shared by every thread of one run
struct RunThrottles {
    global: Arc<ResourceThrottle>,
    servers: ServerThrottles,
}

impl ThrottledOrchestrator {
    /// # Arguments
    ///
    /// * `source` - Where feeds and articles come from
    /// * `indexer` - The index every article is added to
    /// * `feed_list_uri` - Location of the feed list
    /// * `throttle` - Thread caps; `feed_threads` must be below `max_threads`
    pub fn new(
        source: Arc<dyn NewsSource>,
        indexer: Arc<ArticleIndexer>,
        feed_list_uri: impl Into<String>,
        throttle: &ThrottleConfig,
    ) -> Self {
        Self {
            source,
            indexer,
            feed_list_uri: feed_list_uri.into(),
            max_threads: throttle.max_threads,
            feed_threads: throttle.feed_threads,
            threads_per_server: throttle.threads_per_server,
        }
    }
}

impl CrawlOrchestrator for ThrottledOrchestrator {
    fn name(&self) -> &'static str {
        "throttled"
    }

    fn run(&self) -> Result<CrawlReport> {
        let context = Arc::new(CrawlContext::new(
            Arc::clone(&self.source),
            Arc::clone(&self.indexer),
            self.feed_list_uri.clone(),
        ));
        let throttles = Arc::new(RunThrottles {
            global: Arc::new(ResourceThrottle::new("global", self.max_threads)),
            servers: ServerThrottles::new(self.threads_per_server),
        });
        let feed_slots = Arc::new(ResourceThrottle::new("feeds", self.feed_threads));

        tracing::info!(
            "Crawling with at most {} threads ({} feeds, {} per server)",
            throttles.global.capacity(),
            feed_slots.capacity(),
            self.threads_per_server.max(1)
        );

        let mut feed_handles = Vec::new();
        for (feed_id, (name, url)) in context.load_feeds().into_iter().enumerate() {
            let feed_permit = feed_slots.acquire_owned();
            let global_permit = throttles.global.acquire_owned();
            let context = Arc::clone(&context);
            let throttles = Arc::clone(&throttles);

            let spawned = thread::Builder::new()
                .name(format!("feed-{}", feed_id))
                .spawn(move || {
                    let _permits = (feed_permit, global_permit);
                    crawl_feed(feed_id, &context, &throttles, &name, &url);
                });
            match spawned {
                Ok(handle) => feed_handles.push(handle),
                Err(e) => tracing::warn!("Could not spawn feed thread {}: {}", feed_id, e),
            }
        }

        join_all(feed_handles, "feed");

        let report = context.report(self.name());
        tracing::info!(
            "Throttled crawl finished: {} articles indexed from {} feeds in {:.2}s ({} servers)",
            report.articles_indexed,
            report.feeds,
            report.elapsed.as_secs_f64(),
            throttles.servers.server_count()
        );
        Ok(report)
    }
}

/// Body of one feed thread: spawns an article thread per unclaimed article
/// and joins them all
fn crawl_feed(
    feed_id: usize,
    context: &Arc<CrawlContext>,
    throttles: &RunThrottles,
    name: &str,
    url: &str,
) {
    let mut article_handles = Vec::new();

    for (article_id, article) in context.load_articles(name, url).into_iter().enumerate() {
        if !context.claim(&article) {
            continue;
        }

        let global_permit = throttles.global.acquire_owned();
        let server_permit = throttles.servers.acquire(&article.server());
        let article_url = article.url.clone();
        let thread_context = Arc::clone(context);
        let spawned = thread::Builder::new()
            .name(format!("article-{}-{}", feed_id, article_id))
            .spawn(move || {
                let _permits = (global_permit, server_permit);
                thread_context.process_article(article);
            });

        match spawned {
            Ok(handle) => article_handles.push(handle),
            Err(e) => context.abandon_article(&article_url, &e.to_string()),
        }
    }

    join_all(article_handles, "article");
}

fn join_all(handles: Vec<JoinHandle<()>>, kind: &str) {
    for handle in handles {
        if handle.join().is_err() {
            tracing::error!("An {} thread panicked", kind);
        }
    }
}
