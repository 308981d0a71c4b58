//! News aggregator main entry point
//!
//! Crawls the configured feed list, builds the article index and then answers
//! search terms typed on standard input.

use anyhow::Context;
use clap::Parser;
use news_aggregator::config::{load_config_with_hash, Config};
use news_aggregator::{HttpSource, NewsAggregator};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// News aggregator: crawl RSS feeds and search the articles they link to
///
/// Every article named by every feed in the feed list is downloaded,
/// tokenized and indexed. Articles republished under the same title by the
/// same server are merged into one story.
#[derive(Parser, Debug)]
#[command(name = "aggregate")]
#[command(version)]
#[command(about = "Crawl RSS feeds and search the articles they link to", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, overrides_with = "quiet")]
    verbose: u8,

    /// Only log errors and skip the crawl summary
    #[arg(short, long, overrides_with = "verbose")]
    quiet: bool,

    /// Feed list to crawl (URL, file:// URL or path)
    #[arg(short, long, value_name = "FEED_LIST")]
    url: Option<String>,

    /// Use fixed worker pools instead of a thread per feed and article
    #[arg(short, long)]
    conserve_threads: bool,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    if let Some(url) = cli.url {
        config.feeds.feed_list = url;
    }

    let source = HttpSource::new(&config.user_agent, &config.fetch)
        .context("Failed to build HTTP client")?;
    let mut aggregator = NewsAggregator::new(&config, Arc::new(source), cli.conserve_threads);

    tracing::info!(
        "Crawling {} with the {} strategy",
        config.feeds.feed_list,
        aggregator.strategy()
    );
    let report = aggregator.build_index().context("Crawl failed")?;
    if !cli.quiet {
        println!("{}\n", report);
    }

    aggregator
        .query_index(io::stdin().lock(), io::stdout().lock())
        .context("Query console failed")?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so the query console owns stdout.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("news_aggregator=info,warn"),
            1 => EnvFilter::new("news_aggregator=debug,info"),
            _ => EnvFilter::new("news_aggregator=trace,debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_names(true)
        .with_file(false)
        .init();
}
