//! Crawl summary

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// What one crawl did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    /// Name of the orchestrator that ran the crawl
    pub strategy: &'static str,
    /// Feeds attempted
    pub feeds: usize,
    /// Feeds that could not be loaded or parsed
    pub feeds_failed: usize,
    /// Articles claimed for fetching
    pub articles_scheduled: usize,
    /// Articles whose tokens reached the indexer
    pub articles_indexed: usize,
    /// Articles that could not be loaded or parsed
    pub articles_failed: usize,
    /// Article URLs skipped because another feed claimed them first
    pub duplicate_urls_skipped: usize,
    /// Distinct titles in the index after the crawl
    pub titles: usize,
    /// Distinct tokens in the index after the crawl
    pub tokens: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Articles per second over the whole crawl
    pub fn article_rate(&self) -> f64 {
        let seconds = self.elapsed.as_secs_f64();
        if seconds == 0.0 {
            return 0.0;
        }
        self.articles_indexed as f64 / seconds
    }

    /// Percentage of scheduled articles that failed
    pub fn failure_rate(&self) -> f64 {
        if self.articles_scheduled == 0 {
            return 0.0;
        }
        (self.articles_failed as f64 / self.articles_scheduled as f64) * 100.0
    }
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Crawl summary ({})", self.strategy)?;
        writeln!(
            f,
            "  Started:    {}",
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(
            f,
            "  Finished:   {}",
            self.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(
            f,
            "  Elapsed:    {:.2}s ({:.1} articles/sec)",
            self.elapsed.as_secs_f64(),
            self.article_rate()
        )?;
        writeln!(
            f,
            "  Feeds:      {} ({} failed)",
            self.feeds, self.feeds_failed
        )?;
        writeln!(
            f,
            "  Articles:   {} indexed, {} failed ({:.1}%), {} duplicate URLs skipped",
            self.articles_indexed,
            self.articles_failed,
            self.failure_rate(),
            self.duplicate_urls_skipped
        )?;
        write!(
            f,
            "  Index:      {} titles, {} distinct tokens",
            self.titles, self.tokens
        )
    }
}
