//! End-to-end crawls against a mock site

use crate::common::{create_test_config, html_page, mount_page};
use ripple_crawl::crawler::{CrawlOutcome, Crawler};
use ripple_crawl::output::{generate_markdown_summary, write_results, CrawlReport, RESULTS_FILE};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/",
        "Home",
        &[format!("{}/page1", base_url), format!("{}/page2", base_url)],
        1,
    )
    .await;
    mount_page(&mock_server, "/page1", "Page 1", &[format!("{}/", base_url)], 1).await;
    mount_page(
        &mock_server,
        "/page2",
        "Page 2",
        &[
            "/page3".to_string(),
            "http://other.test/elsewhere".to_string(),
            "/logo.png".to_string(),
            "mailto:team@example.com".to_string(),
            "/page1#section".to_string(),
        ],
        1,
    )
    .await;
    mount_page(&mock_server, "/page3", "Page 3", &[], 1).await;

    let config = create_test_config(&mock_server, dir.path());
    let crawler = Crawler::from_config(config).expect("Failed to create crawler");
    let outcome = crawler.run(CancellationToken::new()).await;
    assert_eq!(outcome, CrawlOutcome::Completed);

    let mut urls: Vec<_> = crawler.results().into_iter().map(|r| r.url).collect();
    urls.sort();
    assert_eq!(
        urls,
        vec![
            format!("{}/", base_url),
            format!("{}/page1", base_url),
            format!("{}/page2", base_url),
            format!("{}/page3", base_url),
        ]
    );

    let stats = crawler.stats();
    assert_eq!(stats.pages_crawled, 4);
    assert_eq!(stats.errors, 0);
    assert_eq!(stats.external_links, 1);
    assert_eq!(stats.excluded_links, 2);

    let home = crawler
        .results()
        .into_iter()
        .find(|r| r.url == format!("{}/", base_url))
        .unwrap();
    assert_eq!(home.title, "Home");
    assert_eq!(home.depth, 0);
    assert_eq!(home.status_code, 200);

    // A completed crawl leaves no checkpoint behind
    assert!(!crawler.checkpoint_store().exists());
}

#[tokio::test]
async fn test_depth_bound() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/", "0", &[format!("{}/one", base_url)], 1).await;
    mount_page(&mock_server, "/one", "1", &[format!("{}/two", base_url)], 1).await;
    mount_page(&mock_server, "/two", "2", &[format!("{}/three", base_url)], 1).await;
    mount_page(&mock_server, "/three", "3", &[], 0).await;

    let mut config = create_test_config(&mock_server, dir.path());
    config.crawler.max_depth = 2;
    let crawler = Crawler::from_config(config).unwrap();
    crawler.run(CancellationToken::new()).await;

    let results = crawler.results();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.depth <= 2));
}

#[tokio::test]
async fn test_error_pages_are_recorded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/",
        "Home",
        &[
            format!("{}/broken", base_url),
            format!("{}/missing", base_url),
            format!("{}/ok", base_url),
        ],
        1,
    )
    .await;
    mount_page(&mock_server, "/ok", "OK", &[], 1).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, dir.path());
    let crawler = Crawler::from_config(config).unwrap();
    let outcome = crawler.run(CancellationToken::new()).await;
    assert_eq!(outcome, CrawlOutcome::Completed);

    let stats = crawler.stats();
    assert_eq!(stats.pages_crawled, 2);
    assert_eq!(stats.errors, 2);

    let results = crawler.results();
    let broken = results.iter().find(|r| r.url.ends_with("/broken")).unwrap();
    assert_eq!(broken.status_code, 500);
    assert_eq!(broken.error.as_deref(), Some("HTTP 500"));
    let missing = results.iter().find(|r| r.url.ends_with("/missing")).unwrap();
    assert_eq!(missing.error.as_deref(), Some("HTTP 404"));
}

#[tokio::test]
async fn test_sitemap_seeds_queue() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    let sitemap = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>{0}/from-sitemap</loc></url>
  <url><loc>{0}/</loc></url>
</urlset>"#,
        base_url
    );
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sitemap, "application/xml"))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/", "Home", &[], 1).await;
    mount_page(&mock_server, "/from-sitemap", "Listed", &[], 1).await;

    let mut config = create_test_config(&mock_server, dir.path());
    config.crawler.use_sitemap = true;
    let crawler = Crawler::from_config(config).unwrap();
    crawler.run(CancellationToken::new()).await;

    let results = crawler.results();
    assert_eq!(results.len(), 2);
    let listed = results
        .iter()
        .find(|r| r.url.ends_with("/from-sitemap"))
        .unwrap();
    assert_eq!(listed.depth, 1);
}

#[tokio::test]
async fn test_rate_limit_spaces_fetches() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    let links: Vec<String> = (1..=5).map(|i| format!("{}/p{}", base_url, i)).collect();
    mount_page(&mock_server, "/", "Home", &links, 1).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html_page("Leaf", &[]), "text/html"))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server, dir.path());
    config.crawler.rate_limit = 2;
    config.crawler.max_workers = 1;
    let crawler = Crawler::from_config(config).unwrap();

    let started = Instant::now();
    crawler.run(CancellationToken::new()).await;
    let elapsed = started.elapsed();

    // 6 fetches at 2/s with a burst of 2: 4 waits of 500ms
    assert_eq!(crawler.results().len(), 6);
    assert!(elapsed >= Duration::from_millis(1900), "took {:?}", elapsed);
}

#[tokio::test]
async fn test_output_documents() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let out_dir = dir.path().join("results");

    mount_page(&mock_server, "/", "Home", &[format!("{}/about", base_url)], 1).await;
    mount_page(&mock_server, "/about", "About", &[], 1).await;

    let config = create_test_config(&mock_server, dir.path());
    let crawler = Crawler::from_config(config).unwrap();
    crawler.run(CancellationToken::new()).await;

    let report = crawler.report();
    let results_path = write_results(&out_dir, &report).unwrap();
    assert_eq!(results_path, out_dir.join(RESULTS_FILE));

    let written: CrawlReport =
        serde_json::from_str(&std::fs::read_to_string(&results_path).unwrap()).unwrap();
    assert_eq!(written.results.len(), 2);
    assert_eq!(written.stats.pages_crawled, 2);
    assert!(written.stats.finished_at.is_some());

    let summary_path = out_dir.join("summary.md");
    generate_markdown_summary(&report, &format!("{}/", base_url), &summary_path).unwrap();
    let summary = std::fs::read_to_string(&summary_path).unwrap();
    assert!(summary.contains("# Crawl Summary"));
    assert!(summary.contains(&format!("| {}/about | 200 | 1 | 0 | About |", base_url)));
}
