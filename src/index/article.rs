use crate::url::origin_server;
use std::cmp::Ordering;
use std::fmt;

/// A news article discovered in a feed
///
/// Articles are ordered by URL, then title, which gives a deterministic
/// tie-break when duplicate stories are merged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Article {
    /// Headline as published in the feed
    pub title: String,

    /// Link to the article page
    pub url: String,
}

impl Article {
    /// Creates a new article
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }

    /// Returns the origin server (lowercase host) of this article's URL
    pub fn server(&self) -> String {
        origin_server(&self.url)
    }

    /// Returns true if both articles tell the same story: identical titles
    /// published by the same origin server
    pub fn same_story(&self, other: &Article) -> bool {
        self.title == other.title && self.server() == other.server()
    }
}

impl Ord for Article {
    fn cmp(&self, other: &Self) -> Ordering {
        self.url
            .cmp(&other.url)
            .then_with(|| self.title.cmp(&other.title))
    }
}

impl PartialOrd for Article {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" <{}>", self.title, self.url)
    }
}
