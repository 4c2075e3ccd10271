//! Checkpoint, resume and cancellation behavior

use crate::common::{create_test_config, mount_page};
use chrono::Utc;
use ripple_crawl::crawler::{CrawlOutcome, Crawler, PageResult};
use ripple_crawl::state::CrawlStats;
use ripple_crawl::storage::{Checkpoint, CheckpointStore};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page(url: String, depth: u32, links: Vec<String>) -> PageResult {
    PageResult {
        url,
        title: String::new(),
        status_code: 200,
        depth,
        links,
        error: None,
        crawled_at: Utc::now(),
        content_type: "text/html".to_string(),
    }
}

#[tokio::test]
async fn test_resume_skips_checkpointed_urls() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    // Checkpoint: 3 visited URLs, 2 results; the home page also linked to /c
    let store = CheckpointStore::for_domain(dir.path(), "127.0.0.1");
    let stats = CrawlStats::new();
    stats.add(ripple_crawl::state::Counter::PagesCrawled, 2);
    store
        .save(&Checkpoint::new(
            vec![
                format!("{}/", base_url),
                format!("{}/a", base_url),
                format!("{}/b", base_url),
            ],
            vec![
                page(
                    format!("{}/", base_url),
                    0,
                    vec![format!("{}/a", base_url), format!("{}/c", base_url)],
                ),
                page(format!("{}/a", base_url), 1, vec![format!("{}/b", base_url)]),
            ],
            stats.snapshot(),
        ))
        .unwrap();

    mount_page(&mock_server, "/", "Home", &[], 0).await;
    mount_page(&mock_server, "/a", "A", &[], 0).await;
    mount_page(&mock_server, "/b", "B", &[], 0).await;
    // Rediscovers every checkpointed URL
    mount_page(
        &mock_server,
        "/c",
        "C",
        &[
            format!("{}/", base_url),
            format!("{}/a", base_url),
            format!("{}/b", base_url),
        ],
        1,
    )
    .await;

    let config = create_test_config(&mock_server, dir.path());
    let crawler = Crawler::from_config(config).unwrap();
    assert_eq!(crawler.checkpoint_store().path(), store.path());

    let outcome = crawler.run(CancellationToken::new()).await;
    assert_eq!(outcome, CrawlOutcome::Completed);

    let results = crawler.results();
    assert_eq!(results.len(), 3);
    let c = results.iter().find(|r| r.url.ends_with("/c")).unwrap();
    assert_eq!(c.depth, 1);
    assert_eq!(crawler.stats().pages_crawled, 3);
    assert!(!store.exists());
}

#[tokio::test]
async fn test_corrupt_checkpoint_starts_fresh() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let store = CheckpointStore::for_domain(dir.path(), "127.0.0.1");
    std::fs::write(store.path(), "{ truncated").unwrap();
    mount_page(&mock_server, "/", "Home", &[], 1).await;

    let config = create_test_config(&mock_server, dir.path());
    let crawler = Crawler::from_config(config).unwrap();
    let outcome = crawler.run(CancellationToken::new()).await;

    assert_eq!(outcome, CrawlOutcome::Completed);
    assert_eq!(crawler.results().len(), 1);
}

#[tokio::test]
async fn test_interrupted_crawl_resumes() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    let slow_page = |links: Vec<String>| {
        ResponseTemplate::new(200)
            .set_body_raw(crate::common::html_page("Slow", &links), "text/html")
            .set_delay(Duration::from_millis(300))
    };
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(slow_page(vec![format!("{}/next", base_url)]))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(slow_page(vec![format!("{}/last", base_url)]))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/last"))
        .respond_with(slow_page(vec![]))
        .mount(&mock_server)
        .await;

    // First run: cancelled while /next is being fetched
    let mut config = create_test_config(&mock_server, dir.path());
    config.crawler.max_workers = 1;
    let first = Crawler::from_config(config.clone()).unwrap();
    let cancel = CancellationToken::new();
    let run = {
        let first = first.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { first.run(cancel).await })
    };
    tokio::time::sleep(Duration::from_millis(450)).await;
    cancel.cancel();

    assert_eq!(run.await.unwrap(), CrawlOutcome::Interrupted);
    let checkpoint = first.checkpoint_store().load().expect("checkpoint saved");
    assert!(checkpoint.visited_urls.contains(&format!("{}/", base_url)));

    // Second run picks up without refetching the home page
    let second = Crawler::from_config(config).unwrap();
    let outcome = second.run(CancellationToken::new()).await;
    assert_eq!(outcome, CrawlOutcome::Completed);

    let mut urls: Vec<_> = second.results().into_iter().map(|r| r.url).collect();
    urls.sort();
    assert_eq!(
        urls,
        vec![
            format!("{}/", base_url),
            format!("{}/last", base_url),
            format!("{}/next", base_url),
        ]
    );
    assert!(!second.checkpoint_store().exists());
}
