//! The news aggregator facade: build the index once, then answer queries

use crate::config::Config;
use crate::crawler::{select_orchestrator, CrawlOrchestrator, CrawlReport};
use crate::index::ArticleIndexer;
use crate::query;
use crate::sources::NewsSource;
use crate::Result;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Owns the index and the crawl strategy that fills it
pub struct NewsAggregator {
    indexer: Arc<ArticleIndexer>,
    orchestrator: Box<dyn CrawlOrchestrator>,
    max_matches: usize,
    report: Option<CrawlReport>,
}

impl NewsAggregator {
    /// Creates an aggregator using the strategy selected by `conserve_threads`
    ///
    /// # Arguments
    ///
    /// * `config` - Feed list, pool, throttle and query settings
    /// * `source` - Where feeds and articles come from
    /// * `conserve_threads` - Use the pooled strategy instead of the throttled one
    pub fn new(config: &Config, source: Arc<dyn NewsSource>, conserve_threads: bool) -> Self {
        let indexer = Arc::new(ArticleIndexer::new());
        let orchestrator =
            select_orchestrator(conserve_threads, config, source, Arc::clone(&indexer));
        Self::with_orchestrator(orchestrator, indexer, config.query.max_matches)
    }

    /// Creates an aggregator around an already built orchestrator
    ///
    /// `indexer` must be the index `orchestrator` fills.
    pub fn with_orchestrator(
        orchestrator: Box<dyn CrawlOrchestrator>,
        indexer: Arc<ArticleIndexer>,
        max_matches: usize,
    ) -> Self {
        Self {
            indexer,
            orchestrator,
            max_matches,
            report: None,
        }
    }

    /// Crawls every feed and indexes every article
    ///
    /// Only the first call crawls; later calls return the first report.
    ///
    /// # Returns
    ///
    /// * `Ok(&CrawlReport)` - The crawl finished (possibly with per-item failures)
    /// * `Err(AggregatorError)` - Crawl threads could not be started
    pub fn build_index(&mut self) -> Result<&CrawlReport> {
        let report = match self.report.take() {
            Some(report) => {
                tracing::debug!("Index already built; skipping crawl");
                report
            }
            None => {
                tracing::info!("Building index with the {} strategy", self.orchestrator.name());
                self.orchestrator.run()?
            }
        };
        let report: &CrawlReport = self.report.insert(report);
        Ok(report)
    }

    /// The report of the crawl, once [`build_index`](Self::build_index) has run
    pub fn report(&self) -> Option<&CrawlReport> {
        self.report.as_ref()
    }

    pub fn indexer(&self) -> &ArticleIndexer {
        &self.indexer
    }

    /// Name of the crawl strategy in use
    pub fn strategy(&self) -> &'static str {
        self.orchestrator.name()
    }

    /// Runs the query console over `input` and `output`
    pub fn query_index<R: BufRead, W: Write>(&self, input: R, output: W) -> io::Result<()> {
        query::run_query_loop(&self.indexer, self.max_matches, input, output)
    }
}
