use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads the aggregator settings from a TOML file
///
/// Missing sections and keys take their defaults; the result is validated
/// before it is returned, so thread caps that could deadlock the throttled
/// crawl are rejected here.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use news_aggregator::config::load_config;
///
/// let config = load_config(Path::new("news-aggregator.toml")).unwrap();
/// println!("Article workers: {}", config.pool.article_workers);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    parse_config(&std::fs::read_to_string(path)?)
}

/// Deserializes and validates settings given as TOML text
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config = toml::from_str::<Config>(content)?;
    validate(&config)?;
    Ok(config)
}

/// Hex SHA-256 digest of a settings file, as logged at startup
pub fn compute_config_hash(path: &Path) -> ConfigResult<String> {
    Ok(digest(&std::fs::read_to_string(path)?))
}

/// Reads a settings file once and returns the parsed settings together with
/// the digest of exactly the text they were parsed from
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, digest(&content)))
}

fn digest(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
