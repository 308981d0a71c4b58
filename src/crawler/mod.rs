//! Crawl orchestration
//!
//! This module drives a crawl from feed list to index:
//! - [`CrawlContext`]: per-run claim set, counters and the shared crawl steps
//! - [`PooledOrchestrator`]: fixed feed and article worker pools
//! - [`ThrottledOrchestrator`]: a thread per feed and per article, bounded by
//!   global, per-feed and per-server throttles
//! - [`CrawlReport`]: what a run did

mod context;
mod pooled;
mod report;
mod throttled;

pub use context::CrawlContext;
pub use pooled::PooledOrchestrator;
pub use report::CrawlReport;
pub use throttled::ThrottledOrchestrator;

use crate::config::Config;
use crate::index::ArticleIndexer;
use crate::sources::NewsSource;
use crate::Result;
use std::sync::Arc;

/// A crawl strategy
///
/// `run` fetches the feed list, every feed and every not-yet-claimed article,
/// feeding the results to the indexer, and returns only after all of that
/// work has finished. Individual fetch failures never make `run` fail; only
/// failing to start threads does.
pub trait CrawlOrchestrator: Send + Sync {
    /// Short name used in logs and reports
    fn name(&self) -> &'static str;

    /// Runs one complete crawl
    fn run(&self) -> Result<CrawlReport>;
}

/// Builds the orchestrator selected on the command line
///
/// # Arguments
///
/// * `conserve_threads` - Use the pooled strategy instead of the throttled one
/// * `config` - Pool and throttle sizes plus the feed list location
/// * `source` - Where feeds and articles come from
/// * `indexer` - The index to fill
pub fn select_orchestrator(
    conserve_threads: bool,
    config: &Config,
    source: Arc<dyn NewsSource>,
    indexer: Arc<ArticleIndexer>,
) -> Box<dyn CrawlOrchestrator> {
    let feed_list = config.feeds.feed_list.clone();
    if conserve_threads {
        Box::new(PooledOrchestrator::new(source, indexer, feed_list, &config.pool))
    } else {
        Box::new(ThrottledOrchestrator::new(
            source,
            indexer,
            feed_list,
            &config.throttle,
        ))
    }
}
