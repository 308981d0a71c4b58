use crate::config::types::{
    Config, FeedsConfig, FetchConfig, PoolConfig, QueryConfig, ThrottleConfig, UserAgentConfig,
};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_feeds_config(&config.feeds)?;
    validate_pool_config(&config.pool)?;
    validate_throttle_config(&config.throttle)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_fetch_config(&config.fetch)?;
    validate_query_config(&config.query)?;
    Ok(())
}

fn validate_feeds_config(config: &FeedsConfig) -> ConfigResult<()> {
    if config.feed_list.trim().is_empty() {
        return Err(ConfigError::Validation(
            "feed_list cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates pooled strategy worker counts
fn validate_pool_config(config: &PoolConfig) -> ConfigResult<()> {
    if config.feed_workers < 1 {
        return Err(ConfigError::Validation(format!(
            "feed_workers must be >= 1, got {}",
            config.feed_workers
        )));
    }

    if config.article_workers < config.feed_workers {
        return Err(ConfigError::Validation(format!(
            "article_workers ({}) must be >= feed_workers ({})",
            config.article_workers, config.feed_workers
        )));
    }

    Ok(())
}

/// Validates throttled strategy caps
///
/// Every feed thread holds one global permit for its whole lifetime, so the
/// global cap must leave room for at least one article thread.
fn validate_throttle_config(config: &ThrottleConfig) -> ConfigResult<()> {
    if config.feed_threads < 1 {
        return Err(ConfigError::Validation(format!(
            "feed_threads must be >= 1, got {}",
            config.feed_threads
        )));
    }

    if config.max_threads <= config.feed_threads {
        return Err(ConfigError::Validation(format!(
            "max_threads ({}) must be greater than feed_threads ({})",
            config.max_threads, config.feed_threads
        )));
    }

    if config.threads_per_server < 1 {
        return Err(ConfigError::Validation(format!(
            "threads_per_server must be >= 1, got {}",
            config.threads_per_server
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::Validation(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> ConfigResult<()> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_query_config(config: &QueryConfig) -> ConfigResult<()> {
    if config.max_matches < 1 {
        return Err(ConfigError::Validation(format!(
            "max_matches must be >= 1, got {}",
            config.max_matches
        )));
    }
    Ok(())
}
