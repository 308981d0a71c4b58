//! Integration tests for the crawl
//!
//! These tests use wiremock to serve feed lists, feeds and article pages over
//! HTTP and run both crawl strategies end-to-end through `HttpSource`.
//!
//! The blocking HTTP client must not be created or dropped on an async
//! runtime thread, so every crawl runs inside `spawn_blocking` and only plain
//! data is handed back.

use news_aggregator::config::{Config, FetchConfig, UserAgentConfig};
use news_aggregator::{Article, CrawlReport, HttpSource, NewsAggregator};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds an RSS document listing `(title, link)` items
fn create_test_rss(items: &[(&str, String)]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\"><channel><title>Test</title>\n",
    );
    for (title, link) in items {
        xml.push_str(&format!(
            "<item><title>{}</title><link>{}</link></item>\n",
            title, link
        ));
    }
    xml.push_str("</channel></rss>\n");
    xml
}

fn create_test_html(body: &str) -> String {
    format!(
        "<html><head><title>ignored</title><script>var ignored = 1;</script></head><body><p>{}</p></body></html>",
        body
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Results of one crawl plus the answers to a few queries
struct CrawlOutcome {
    report: CrawlReport,
    titles: usize,
    matches: Vec<(String, Vec<(Article, u32)>)>,
}

impl CrawlOutcome {
    fn matches_for(&self, term: &str) -> &[(Article, u32)] {
        self.matches
            .iter()
            .find(|(t, _)| t == term)
            .map(|(_, m)| m.as_slice())
            .unwrap_or(&[])
    }
}

/// Crawls `feed_list` on a blocking thread and answers `terms`
async fn crawl(feed_list: String, conserve_threads: bool, terms: &[&str]) -> CrawlOutcome {
    let terms: Vec<String> = terms.iter().map(|t| t.to_string()).collect();
    tokio::task::spawn_blocking(move || {
        let mut config = Config::default();
        config.feeds.feed_list = feed_list;
        config.throttle.max_threads = 4;
        config.throttle.feed_threads = 2;
        config.throttle.threads_per_server = 2;
        config.pool.feed_workers = 2;
        config.pool.article_workers = 4;

        let source = HttpSource::new(&config.user_agent, &config.fetch).unwrap();
        let mut aggregator = NewsAggregator::new(&config, Arc::new(source), conserve_threads);
        let report = aggregator.build_index().unwrap().clone();

        let matches = terms
            .into_iter()
            .map(|term| {
                let found = aggregator.indexer().get_matching_articles(&term);
                (term, found)
            })
            .collect();

        CrawlOutcome {
            report,
            titles: aggregator.indexer().title_count(),
            matches,
        }
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_same_story_same_server_is_merged() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/feeds.xml",
        create_test_rss(&[("Wire", format!("{}/feed.xml", base))]),
    )
    .await;
    mount_page(
        &server,
        "/feed.xml",
        create_test_rss(&[
            ("Same story", format!("{}/b", base)),
            ("Same story", format!("{}/a", base)),
        ]),
    )
    .await;
    mount_page(&server, "/a", create_test_html("alpha beta")).await;
    mount_page(&server, "/b", create_test_html("beta gamma")).await;

    for conserve_threads in [false, true] {
        let outcome = crawl(
            format!("{}/feeds.xml", base),
            conserve_threads,
            &["alpha", "beta", "gamma", "ignored"],
        )
        .await;

        assert_eq!(outcome.report.articles_indexed, 2);
        assert_eq!(outcome.titles, 1);

        let beta = outcome.matches_for("beta");
        assert_eq!(beta.len(), 1);
        assert_eq!(beta[0].0.url, format!("{}/a", base));
        assert_eq!(beta[0].1, 1);

        assert!(outcome.matches_for("alpha").is_empty());
        assert!(outcome.matches_for("gamma").is_empty());
        assert!(outcome.matches_for("ignored").is_empty());
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_distinct_titles_are_indexed_separately() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/feeds.xml",
        create_test_rss(&[("Daily", format!("{}/daily.xml", base))]),
    )
    .await;
    mount_page(
        &server,
        "/daily.xml",
        create_test_rss(&[
            ("Markets rally", format!("{}/markets", base)),
            ("Storm warning", format!("{}/weather", base)),
        ]),
    )
    .await;
    mount_page(&server, "/markets", create_test_html("stocks stocks bonds")).await;
    mount_page(&server, "/weather", create_test_html("rain wind")).await;

    for conserve_threads in [false, true] {
        let outcome = crawl(
            format!("{}/feeds.xml", base),
            conserve_threads,
            &["stocks", "wind"],
        )
        .await;

        assert_eq!(outcome.titles, 2);
        assert_eq!(
            outcome.matches_for("stocks"),
            &[(Article::new("Markets rally", format!("{}/markets", base)), 2)]
        );
        assert_eq!(outcome.matches_for("wind").len(), 1);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_article_listed_by_two_feeds_is_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/feeds.xml",
        create_test_rss(&[
            ("First", format!("{}/first.xml", base)),
            ("Second", format!("{}/second.xml", base)),
        ]),
    )
    .await;
    let shared = [("Shared", format!("{}/shared", base))];
    mount_page(&server, "/first.xml", create_test_rss(&shared)).await;
    mount_page(&server, "/second.xml", create_test_rss(&shared)).await;

    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(ResponseTemplate::new(200).set_body_string(create_test_html("syndicated")))
        .expect(2)
        .mount(&server)
        .await;

    // One fetch per crawl, two crawls
    for conserve_threads in [false, true] {
        let outcome = crawl(format!("{}/feeds.xml", base), conserve_threads, &["syndicated"]).await;

        assert_eq!(outcome.report.feeds, 2);
        assert_eq!(outcome.report.articles_scheduled, 1);
        assert_eq!(outcome.report.duplicate_urls_skipped, 1);
        assert_eq!(outcome.matches_for("syndicated").len(), 1);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_sources_do_not_abort_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/feeds.xml",
        create_test_rss(&[
            ("Missing", format!("{}/missing.xml", base)),
            ("Broken", format!("{}/broken.xml", base)),
            ("Working", format!("{}/working.xml", base)),
        ]),
    )
    .await;
    mount_status(&server, "/missing.xml", 404).await;
    mount_page(&server, "/broken.xml", "<rss><channel><item></rss>".to_string()).await;
    mount_page(
        &server,
        "/working.xml",
        create_test_rss(&[
            ("Gone", format!("{}/gone", base)),
            ("Fine", format!("{}/fine", base)),
        ]),
    )
    .await;
    mount_status(&server, "/gone", 500).await;
    mount_page(&server, "/fine", create_test_html("survivor")).await;

    for conserve_threads in [false, true] {
        let outcome = crawl(format!("{}/feeds.xml", base), conserve_threads, &["survivor"]).await;

        assert_eq!(outcome.report.feeds, 3);
        assert_eq!(outcome.report.feeds_failed, 2);
        assert_eq!(outcome.report.articles_indexed, 1);
        assert_eq!(outcome.report.articles_failed, 1);
        assert_eq!(outcome.matches_for("survivor").len(), 1);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_feeds_sharing_a_name_are_all_crawled() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/feeds.xml",
        create_test_rss(&[
            ("Top Stories", format!("{}/a.xml", base)),
            ("Top Stories", format!("{}/b.xml", base)),
        ]),
    )
    .await;
    mount_page(&server, "/a.xml", create_test_rss(&[("From A", format!("{}/a/1", base))])).await;
    mount_page(&server, "/b.xml", create_test_rss(&[("From B", format!("{}/b/1", base))])).await;
    mount_page(&server, "/a/1", create_test_html("apples")).await;
    mount_page(&server, "/b/1", create_test_html("bananas")).await;

    for conserve_threads in [false, true] {
        let outcome = crawl(
            format!("{}/feeds.xml", base),
            conserve_threads,
            &["apples", "bananas"],
        )
        .await;

        assert_eq!(outcome.report.feeds, 2);
        assert_eq!(outcome.matches_for("apples").len(), 1);
        assert_eq!(outcome.matches_for("bananas").len(), 1);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_remote_feed_cannot_index_local_files() {
    let mut secret = NamedTempFile::new().unwrap();
    secret.write_all(b"<p>topsecretvalue</p>").unwrap();
    secret.flush().unwrap();
    let secret_url = Url::from_file_path(secret.path()).unwrap().to_string();

    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/feeds.xml",
        create_test_rss(&[("Remote", format!("{}/feed.xml", base))]),
    )
    .await;
    mount_page(
        &server,
        "/feed.xml",
        create_test_rss(&[
            ("Leak", secret_url),
            ("Public", format!("{}/public", base)),
        ]),
    )
    .await;
    mount_page(&server, "/public", create_test_html("harmless")).await;

    for conserve_threads in [false, true] {
        let outcome = crawl(
            format!("{}/feeds.xml", base),
            conserve_threads,
            &["topsecretvalue", "harmless"],
        )
        .await;

        assert_eq!(outcome.report.articles_scheduled, 1);
        assert!(outcome.matches_for("topsecretvalue").is_empty());
        assert_eq!(outcome.matches_for("harmless").len(), 1);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreadable_feed_list_yields_empty_index() {
    let server = MockServer::start().await;
    mount_status(&server, "/feeds.xml", 503).await;

    let outcome = crawl(format!("{}/feeds.xml", server.uri()), false, &[]).await;

    assert_eq!(outcome.report.feeds, 0);
    assert_eq!(outcome.report.articles_scheduled, 0);
    assert_eq!(outcome.titles, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_requests_carry_user_agent() {
    let server = MockServer::start().await;
    let base = server.uri();
    let user_agent = UserAgentConfig::default().header_value();

    Mock::given(method("GET"))
        .and(path("/feeds.xml"))
        .and(header("user-agent", user_agent.as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(create_test_rss(&[("Feed", format!("{}/feed.xml", base))])),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/feed.xml", create_test_rss(&[])).await;

    let outcome = crawl(format!("{}/feeds.xml", base), false, &[]).await;
    assert_eq!(outcome.report.feeds, 1);
    assert_eq!(outcome.report.feeds_failed, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_timeout_counts_as_failure() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/feeds.xml",
        create_test_rss(&[("Slow", format!("{}/slow.xml", base))]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow.xml"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(3)))
        .mount(&server)
        .await;

    let feed_list = format!("{}/feeds.xml", base);
    let report = tokio::task::spawn_blocking(move || {
        let mut config = Config::default();
        config.feeds.feed_list = feed_list;
        let fetch = FetchConfig {
            timeout_secs: 1,
            connect_timeout_secs: 1,
        };
        let source = HttpSource::new(&config.user_agent, &fetch).unwrap();
        let mut aggregator = NewsAggregator::new(&config, Arc::new(source), false);
        aggregator.build_index().unwrap().clone()
    })
    .await
    .unwrap();

    assert_eq!(report.feeds, 1);
    assert_eq!(report.feeds_failed, 1);
}
