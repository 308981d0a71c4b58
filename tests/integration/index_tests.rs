//! Integration tests for the index and the concurrency primitives
//!
//! These exercise the public API only: the dedup-aware indexer under
//! concurrent updates, the URL claim set, the worker pool and the throttles,
//! and both crawl strategies over an in-memory source.

use news_aggregator::concurrency::{ResourceThrottle, ServerThrottles, WorkerPool};
use news_aggregator::config::{Config, PoolConfig, ThrottleConfig};
use news_aggregator::{
    Article, ArticleIndexer, CrawlOrchestrator, MemorySource, NewsAggregator, NewsSource,
    PooledOrchestrator, SeenUrls, ThrottledOrchestrator, TokenSet,
};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn create_test_tokens(words: &[&str]) -> TokenSet {
    TokenSet::from_tokens(words.iter().copied())
}

/// A feed list with one feed listing `articles`, each with its body text
fn create_test_source(articles: &[(&str, &str, &str)]) -> MemorySource {
    let mut source = MemorySource::new()
        .with_feed_list("feeds", [("Feed", "mem://feed/rss")])
        .with_feed(
            "mem://feed/rss",
            articles
                .iter()
                .map(|(title, url, _)| Article::new(*title, *url))
                .collect(),
        );
    for (_, url, body) in articles {
        source = source.with_document(url, body);
    }
    source
}

fn create_test_orchestrators(
    source: Arc<dyn NewsSource>,
) -> Vec<(Box<dyn CrawlOrchestrator>, Arc<ArticleIndexer>)> {
    let pooled_index = Arc::new(ArticleIndexer::new());
    let throttled_index = Arc::new(ArticleIndexer::new());
    vec![
        (
            Box::new(PooledOrchestrator::new(
                Arc::clone(&source),
                Arc::clone(&pooled_index),
                "feeds",
                &PoolConfig {
                    feed_workers: 2,
                    article_workers: 3,
                },
            )) as Box<dyn CrawlOrchestrator>,
            pooled_index,
        ),
        (
            Box::new(ThrottledOrchestrator::new(
                source,
                Arc::clone(&throttled_index),
                "feeds",
                &ThrottleConfig {
                    max_threads: 3,
                    feed_threads: 1,
                    threads_per_server: 1,
                },
            )) as Box<dyn CrawlOrchestrator>,
            throttled_index,
        ),
    ]
}

#[test]
fn test_disjoint_titles_indexed_once_per_article_in_any_interleaving() {
    let indexer = Arc::new(ArticleIndexer::new());
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let indexer = Arc::clone(&indexer);
            thread::spawn(move || {
                for a in 0..25 {
                    let article = Article::new(
                        format!("Title {t}-{a}"),
                        format!("https://server{}.com/{t}/{a}", a % 3),
                    );
                    indexer.update_index(
                        article,
                        create_test_tokens(&["everywhere", format!("tok{t}x{a}").as_str()]),
                    );
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let everywhere = indexer.get_matching_articles("everywhere");
    assert_eq!(everywhere.len(), 200);
    assert!(everywhere.iter().all(|(_, count)| *count == 1));
    let distinct: BTreeSet<_> = everywhere.iter().map(|(article, _)| article.url.clone()).collect();
    assert_eq!(distinct.len(), 200);
    assert_eq!(indexer.get_matching_articles("tok5x17").len(), 1);
    assert_eq!(indexer.title_count(), 200);
}

#[test]
fn test_same_title_same_server_intersection() {
    let indexer = ArticleIndexer::new();
    indexer.update_index(
        Article::new("Story", "https://s.com/2"),
        create_test_tokens(&["a", "b", "c"]),
    );
    indexer.update_index(
        Article::new("Story", "https://s.com/1"),
        create_test_tokens(&["b", "c", "d"]),
    );

    let winner = Article::new("Story", "https://s.com/1");
    assert_eq!(indexer.get_matching_articles("b"), vec![(winner.clone(), 1)]);
    assert_eq!(indexer.get_matching_articles("c"), vec![(winner, 1)]);
    assert!(indexer.get_matching_articles("a").is_empty());
    assert!(indexer.get_matching_articles("d").is_empty());
}

#[test]
fn test_same_title_different_servers_both_indexed() {
    let indexer = ArticleIndexer::new();
    indexer.update_index(
        Article::new("Story", "https://one.com/x"),
        create_test_tokens(&["a", "b"]),
    );
    indexer.update_index(
        Article::new("Story", "https://two.com/x"),
        create_test_tokens(&["b", "c"]),
    );

    assert_eq!(indexer.get_matching_articles("a").len(), 1);
    assert_eq!(indexer.get_matching_articles("b").len(), 2);
    assert_eq!(indexer.get_matching_articles("c").len(), 1);
}

#[test]
fn test_contains_url_false_exactly_once() {
    let seen = Arc::new(SeenUrls::new());
    let firsts = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let seen = Arc::clone(&seen);
            let firsts = Arc::clone(&firsts);
            thread::spawn(move || {
                if !seen.contains_url("https://contested.com/story") {
                    firsts.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(firsts.load(Ordering::SeqCst), 1);
}

#[test]
fn test_pool_counts_every_task() {
    for workers in [1, 3, 8] {
        let pool = WorkerPool::new("count", workers).unwrap();
        for tasks in [0, 1, 64] {
            let counter = Arc::new(AtomicUsize::new(0));
            for _ in 0..tasks {
                let counter = Arc::clone(&counter);
                pool.schedule(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            }
            pool.wait();
            assert_eq!(counter.load(Ordering::SeqCst), tasks);
        }
    }
}

#[test]
fn test_wait_ignores_tasks_scheduled_later() {
    let pool = WorkerPool::new("horizon", 2).unwrap();
    let handle = pool.handle();
    let done = Arc::new(AtomicUsize::new(0));

    // The first task schedules a slow follow-up; wait() only covers the first
    let follow_up_done = Arc::clone(&done);
    pool.schedule(move || {
        thread::sleep(Duration::from_millis(50));
        handle.schedule(move || {
            thread::sleep(Duration::from_millis(200));
            follow_up_done.fetch_add(1, Ordering::SeqCst);
        });
    });
    pool.wait();
    assert_eq!(done.load(Ordering::SeqCst), 0);

    pool.wait();
    assert_eq!(done.load(Ordering::SeqCst), 1);
}

#[test]
fn test_throttle_bounds_holders() {
    let capacity = 2;
    let throttle = Arc::new(ResourceThrottle::new("bound", capacity));
    let holders = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..12)
        .map(|_| {
            let permit = throttle.acquire_owned();
            let holders = Arc::clone(&holders);
            let peak = Arc::clone(&peak);
            thread::spawn(move || {
                let now = holders.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(3));
                holders.fetch_sub(1, Ordering::SeqCst);
                drop(permit);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(peak.load(Ordering::SeqCst) <= capacity);
    assert_eq!(throttle.available(), capacity);
}

#[test]
fn test_server_throttles_are_independent() {
    let servers = ServerThrottles::new(1);
    let _a = servers.acquire("a.com");
    let _b = servers.acquire("b.com");

    assert_eq!(servers.server_count(), 2);
    assert_eq!(servers.throttle_for("a.com").available(), 0);
    assert_eq!(servers.throttle_for("c.com").available(), 1);
}

#[test]
fn test_both_strategies_merge_duplicate_story() {
    let source: Arc<dyn NewsSource> = Arc::new(create_test_source(&[
        ("Same", "https://wire.com/1", "alpha beta"),
        ("Same", "https://wire.com/2", "beta gamma"),
    ]));

    for (orchestrator, indexer) in create_test_orchestrators(source) {
        orchestrator.run().unwrap();

        assert_eq!(indexer.get_matching_articles("beta").len(), 1, "{}", orchestrator.name());
        assert!(indexer.get_matching_articles("alpha").is_empty());
        assert!(indexer.get_matching_articles("gamma").is_empty());
    }
}

#[test]
fn test_both_strategies_keep_distinct_titles() {
    let source: Arc<dyn NewsSource> = Arc::new(create_test_source(&[
        ("First", "https://news.com/1", "apple banana"),
        ("Second", "https://news.com/2", "cherry date"),
    ]));

    for (orchestrator, indexer) in create_test_orchestrators(source) {
        let report = orchestrator.run().unwrap();

        assert_eq!(report.titles, 2, "{}", orchestrator.name());
        assert_eq!(indexer.title_count(), 2);
        assert_eq!(
            indexer.get_matching_articles("apple"),
            vec![(Article::new("First", "https://news.com/1"), 1)]
        );
    }
}

#[test]
fn test_strategies_build_identical_indexes() {
    let mut articles = Vec::new();
    let mut bodies = Vec::new();
    for i in 0..30 {
        let server = i % 4;
        // Repeats all come from server 0, so the merge order does not matter
        let title = if i % 4 == 0 { "Repeated".to_string() } else { format!("Story {i}") };
        articles.push((title, format!("https://s{server}.com/{i:02}")));
        bodies.push(format!("common w{} w{}", i % 7, i));
    }
    let triples: Vec<(&str, &str, &str)> = articles
        .iter()
        .zip(&bodies)
        .map(|((title, url), body)| (title.as_str(), url.as_str(), body.as_str()))
        .collect();
    let source: Arc<dyn NewsSource> = Arc::new(create_test_source(&triples));

    let results: Vec<Vec<_>> = create_test_orchestrators(source)
        .into_iter()
        .map(|(orchestrator, indexer)| {
            orchestrator.run().unwrap();
            ["common", "w0", "w3", "w10", "w25"]
                .iter()
                .map(|term| indexer.get_matching_articles(term))
                .collect()
        })
        .collect();

    assert_eq!(results[0], results[1]);
}

#[test]
fn test_aggregator_session_over_memory_source() {
    let source = create_test_source(&[("Hello", "https://greet.com/1", "hello hello world")]);
    let mut config = Config::default();
    config.feeds.feed_list = "feeds".to_string();
    let mut aggregator = NewsAggregator::new(&config, Arc::new(source), true);
    aggregator.build_index().unwrap();

    let mut output = Vec::new();
    aggregator
        .query_index("HELLO\nnowhere\n".as_bytes(), &mut output)
        .unwrap();
    let output = String::from_utf8(output).unwrap();

    assert!(output.contains("That term appears in 1 article.  Here it is:"));
    assert!(output.contains("   1.) \"Hello\" [appears 2 times]."));
    assert!(output.contains("       \"https://greet.com/1\""));
    assert!(output.contains("Ah, we didn't find the term \"nowhere\". Try again."));
}
