//! HTTP-backed news source
//!
//! Feed lists, feeds and articles are loaded from:
//! - `http://` and `https://` URLs, with a blocking `reqwest` client
//! - `file://` URLs and plain filesystem paths
//!
//! Network failures, HTTP error statuses and unreadable files all surface as
//! the matching [`SourceError`] variant for the document being loaded.

use crate::config::{FetchConfig, UserAgentConfig};
use crate::index::{Article, TokenSet};
use crate::sources::{document, feed, NewsSource};
use crate::{SourceError, SourceResult};
use reqwest::blocking::Client;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Builds the blocking HTTP client shared by every crawl thread
///
/// # Arguments
///
/// * `user_agent` - Identification sent with every request
/// * `fetch` - Request and connect timeouts
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    fetch: &FetchConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(fetch.timeout_secs))
        .connect_timeout(Duration::from_secs(fetch.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`NewsSource`] that loads documents over HTTP or from disk
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    /// Creates a source with its own HTTP client
    ///
    /// Must not be called from inside an async runtime; the blocking client
    /// owns a runtime of its own.
    pub fn new(user_agent: &UserAgentConfig, fetch: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent, fetch)?,
        })
    }

    /// Loads the document at `location` as text
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The document body
    /// * `Err(String)` - Why the document could not be loaded
    fn load(&self, location: &str) -> Result<String, String> {
        if location.starts_with("http://") || location.starts_with("https://") {
            tracing::trace!("GET {}", location);
            let response = self
                .client
                .get(location)
                .send()
                .map_err(|e| describe_request_error(&e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(format!("HTTP {}", status.as_u16()));
            }
            return response.text().map_err(|e| e.to_string());
        }

        let path = local_path(location)?;
        std::fs::read_to_string(&path).map_err(|e| format!("{}: {}", path.display(), e))
    }
}

fn describe_request_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timeout".to_string()
    } else if error.is_connect() {
        "connection failed".to_string()
    } else {
        error.to_string()
    }
}

fn local_path(location: &str) -> Result<PathBuf, String> {
    if location.starts_with("file:") {
        let url = Url::parse(location).map_err(|e| e.to_string())?;
        return url
            .to_file_path()
            .map_err(|_| format!("{} is not a local file URL", location));
    }
    Ok(PathBuf::from(location))
}

impl NewsSource for HttpSource {
    fn fetch_feed_list(&self, uri: &str) -> SourceResult<Vec<(String, String)>> {
        let body = self
            .load(uri)
            .map_err(|reason| SourceError::FeedListUnparseable {
                uri: uri.to_string(),
                reason,
            })?;
        feed::parse_feed_list(&body, uri)
    }

    fn fetch_feed(&self, url: &str) -> SourceResult<Vec<Article>> {
        let body = self.load(url).map_err(|reason| SourceError::FeedUnparseable {
            url: url.to_string(),
            reason,
        })?;
        feed::parse_feed(&body, url)
    }

    fn fetch_tokens(&self, url: &str) -> SourceResult<TokenSet> {
        let body = self
            .load(url)
            .map_err(|reason| SourceError::DocumentUnparseable {
                url: url.to_string(),
                reason,
            })?;
        Ok(document::tokenize(&document::extract_text(&body)))
    }
}
