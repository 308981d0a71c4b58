//! News Aggregator: a concurrent RSS crawler and article index
//!
//! This crate crawls a list of RSS feeds, fetches every linked article,
//! tokenizes the article text and builds an in-memory inverted index. Articles
//! republished under the same title by the same server are merged into a
//! single story.
//!
//! Two interchangeable crawl strategies are provided:
//! - [`crawler::PooledOrchestrator`] recycles a fixed number of worker threads
//! - [`crawler::ThrottledOrchestrator`] spawns a thread per unit of work and
//!   bounds concurrency with counting throttles

pub mod aggregator;
pub mod concurrency;
pub mod config;
pub mod crawler;
pub mod index;
pub mod query;
pub mod sources;
pub mod url;

use thiserror::Error;

/// Main error type for news aggregator operations
#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Worker pool error: {0}")]
    Pool(String),

    #[error("Failed to spawn thread {name}: {source}")]
    ThreadSpawn {
        name: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Failures reported by the feed list, feed and article collaborators
///
/// None of these abort a crawl: the orchestrators log them and carry on with
/// zero items from the failing source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Feed list {uri} could not be parsed: {reason}")]
    FeedListUnparseable { uri: String, reason: String },

    #[error("Feed {url} could not be parsed: {reason}")]
    FeedUnparseable { url: String, reason: String },

    #[error("Document {url} could not be parsed: {reason}")]
    DocumentUnparseable { url: String, reason: String },
}

/// Result type alias for news aggregator operations
pub type Result<T> = std::result::Result<T, AggregatorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for collaborator operations
pub type SourceResult<T> = std::result::Result<T, SourceError>;

// Re-export commonly used types
pub use aggregator::NewsAggregator;
pub use config::Config;
pub use crawler::{CrawlOrchestrator, CrawlReport, PooledOrchestrator, ThrottledOrchestrator};
pub use index::{Article, ArticleIndexer, SeenUrls, TokenSet};
pub use sources::{HttpSource, MemorySource, NewsSource};
pub use crate::url::origin_server;
