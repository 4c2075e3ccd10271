//! Shared helpers for the integration tests

use ripple_crawl::config::Config;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling the mock server's root
pub fn create_test_config(server: &MockServer, checkpoint_dir: &Path) -> Config {
    let mut config = Config::for_url(format!("{}/", server.uri()));
    config.crawler.max_depth = 5;
    config.crawler.max_workers = 4;
    config.crawler.rate_limit = 100;
    config.crawler.use_sitemap = false;
    config.output.checkpoint_dir = Some(checkpoint_dir.to_path_buf());
    config
}

/// An HTML page linking to each of `links`
pub fn html_page(title: &str, links: &[String]) -> String {
    let anchors: String = links
        .iter()
        .map(|link| format!("<a href=\"{}\">{}</a>\n", link, link))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body>\n{}</body></html>",
        title, anchors
    )
}

/// Mounts an HTML page at `page_path`, expected to be fetched `times` times
pub async fn mount_page(
    server: &MockServer,
    page_path: &str,
    title: &str,
    links: &[String],
    times: u64,
) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html_page(title, links), "text/html"))
        .expect(times)
        .mount(server)
        .await;
}
