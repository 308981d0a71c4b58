use serde::Deserialize;

/// Default location of the bundled sample feed list
pub const DEFAULT_FEED_LIST: &str = "data/small-feed.xml";

/// Main configuration structure for the news aggregator
///
/// Every section is optional in the TOML file; missing sections and keys
/// fall back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feeds: FeedsConfig,
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

/// Where the crawl starts
#[derive(Debug, Clone, Deserialize)]
pub struct FeedsConfig {
    /// URI of the feed list (http(s) URL, file:// URL or local path)
    #[serde(rename = "feed-list", default = "default_feed_list")]
    pub feed_list: String,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            feed_list: default_feed_list(),
        }
    }
}

fn default_feed_list() -> String {
    DEFAULT_FEED_LIST.to_string()
}

/// Worker counts for the pooled crawl strategy
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    /// Number of workers fetching feeds
    #[serde(rename = "feed-workers", default = "default_feed_workers")]
    pub feed_workers: usize,

    /// Number of workers fetching and indexing articles
    #[serde(rename = "article-workers", default = "default_article_workers")]
    pub article_workers: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            feed_workers: default_feed_workers(),
            article_workers: default_article_workers(),
        }
    }
}

fn default_feed_workers() -> usize {
    6
}

fn default_article_workers() -> usize {
    24
}

/// Concurrency caps for the throttled crawl strategy
#[derive(Debug, Clone, Deserialize)]
pub struct ThrottleConfig {
    /// Maximum number of fetch threads alive at once (feeds and articles)
    #[serde(rename = "max-threads", default = "default_max_threads")]
    pub max_threads: usize,

    /// Maximum number of feed threads alive at once
    #[serde(rename = "feed-threads", default = "default_feed_threads")]
    pub feed_threads: usize,

    /// Maximum number of concurrent article fetches against one server
    #[serde(rename = "threads-per-server", default = "default_threads_per_server")]
    pub threads_per_server: usize,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_threads: default_max_threads(),
            feed_threads: default_feed_threads(),
            threads_per_server: default_threads_per_server(),
        }
    }
}

fn default_max_threads() -> usize {
    24
}

fn default_feed_threads() -> usize {
    6
}

fn default_threads_per_server() -> usize {
    6
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default = "default_contact_url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: default_contact_url(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

fn default_crawler_name() -> String {
    "news-aggregator".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_contact_url() -> String {
    "https://example.com/news-aggregator".to_string()
}

/// HTTP timeouts
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Total request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// Query console configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// Maximum number of matches printed per search term
    #[serde(rename = "max-matches", default = "default_max_matches")]
    pub max_matches: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_matches: default_max_matches(),
        }
    }
}

fn default_max_matches() -> usize {
    15
}
