//! Configuration module for the news aggregator
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A configuration file is optional: [`Config::default`] describes a complete,
//! valid setup that crawls the bundled sample feed list.
//!
//! # Example
//!
//! ```no_run
//! use news_aggregator::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("news-aggregator.toml")).unwrap();
//! println!("Per-server cap: {}", config.throttle.threads_per_server);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FeedsConfig, FetchConfig, PoolConfig, QueryConfig, ThrottleConfig, UserAgentConfig,
    DEFAULT_FEED_LIST,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
