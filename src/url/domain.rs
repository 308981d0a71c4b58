use url::Url;

/// Extracts the origin server of an article URL
///
/// This is the lowercase host component of the URL. Articles from the same
/// origin server share a throttle and are candidates for duplicate-story
/// merging.
///
/// URLs that do not parse fall back to the text between the scheme separator
/// and the first `/`, so that two malformed URLs on the same host still
/// compare equal.
///
/// # Examples
///
/// ```
/// use news_aggregator::url::origin_server;
///
/// assert_eq!(origin_server("https://EXAMPLE.COM/path"), "example.com");
/// assert_eq!(origin_server("https://sub.example.com:8080/a?b=c"), "sub.example.com");
/// ```
pub fn origin_server(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => host.to_lowercase(),
            None => fallback_server(url),
        },
        Err(_) => fallback_server(url),
    }
}

fn fallback_server(url: &str) -> String {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.split('/').next().unwrap_or(rest).to_lowercase()
}
