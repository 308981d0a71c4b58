use parking_lot::Mutex;
use std::collections::HashSet;

/// URLs already claimed for processing during one crawl
///
/// Claiming is an atomic check-and-insert, so exactly one caller wins each URL
/// no matter how many threads race for it.
#[derive(Debug, Default)]
pub struct SeenUrls {
    urls: Mutex<HashSet<String>>,
}

impl SeenUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `url` was already claimed; otherwise claims it and
    /// returns `false`
    pub fn contains_url(&self, url: &str) -> bool {
        let mut urls = self.urls.lock();
        if urls.contains(url) {
            return true;
        }
        urls.insert(url.to_string());
        false
    }

    /// Number of claimed URLs
    pub fn len(&self) -> usize {
        self.urls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.lock().is_empty()
    }
}
