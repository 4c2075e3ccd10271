//! Sitemap discovery
//!
//! A handful of well-known sitemap locations are tried in order. The first one
//! that yields URLs wins; a sitemap index is expanded one level.

use crate::crawler::fetcher::PageFetcher;
use scraper::{Html, Selector};
use url::Url;

/// Paths probed on the crawl origin, in order
pub const SITEMAP_PATHS: [&str; 3] = ["/sitemap.xml", "/sitemap_index.xml", "/wp-sitemap.xml"];

/// A parsed sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// `<sitemapindex>`: locations of further sitemaps
    Index(Vec<String>),
    /// `<urlset>`: page locations
    UrlSet(Vec<String>),
    /// Neither kind, or no entries
    Empty,
}

/// Parses sitemap XML
///
/// Parsing is lenient: the document is read as markup and only `<loc>`
/// elements under `<sitemap>` or `<url>` are looked at.
pub fn parse_sitemap(xml: &str) -> SitemapDocument {
    let document = Html::parse_document(xml);

    let index = select_locs(&document, "sitemapindex sitemap loc");
    if !index.is_empty() {
        return SitemapDocument::Index(index);
    }

    let urls = select_locs(&document, "urlset url loc");
    if !urls.is_empty() {
        return SitemapDocument::UrlSet(urls);
    }

    SitemapDocument::Empty
}

fn select_locs(document: &Html, selector: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|loc| loc.text().collect::<String>().trim().to_string())
        .filter(|loc| !loc.is_empty())
        .collect()
}

/// Candidate sitemap URLs on the origin of `base_url`
pub fn sitemap_candidates(base_url: &Url) -> Vec<String> {
    SITEMAP_PATHS
        .iter()
        .filter_map(|path| base_url.join(path).ok())
        .map(|url| url.to_string())
        .collect()
}

/// Discovers page URLs from the site's sitemap
///
/// Returns at most `limit` URLs, or an empty list if no sitemap was found.
pub async fn discover_sitemap_urls<F: PageFetcher>(
    fetcher: &F,
    base_url: &Url,
    limit: usize,
) -> Vec<String> {
    for candidate in sitemap_candidates(base_url) {
        tracing::info!("Trying sitemap: {}", candidate);
        let Some(body) = fetcher.fetch_document(&candidate).await else {
            continue;
        };

        let mut urls = match parse_sitemap(&body) {
            SitemapDocument::Index(sitemaps) => {
                tracing::info!("Found sitemap index with {} sitemaps", sitemaps.len());
                let mut urls = Vec::new();
                for sitemap in sitemaps {
                    if urls.len() >= limit {
                        break;
                    }
                    urls.extend(fetch_url_set(fetcher, &sitemap).await);
                }
                urls
            }
            SitemapDocument::UrlSet(urls) => {
                tracing::info!("Found sitemap with {} URLs", urls.len());
                urls
            }
            SitemapDocument::Empty => continue,
        };

        if urls.is_empty() {
            continue;
        }

        if urls.len() > limit {
            tracing::info!("Limiting sitemap URLs from {} to {}", urls.len(), limit);
            urls.truncate(limit);
        }
        return urls;
    }

    tracing::info!("No sitemap found");
    Vec::new()
}

/// Fetches one sitemap listed in an index; nested indexes are not followed
async fn fetch_url_set<F: PageFetcher>(fetcher: &F, sitemap_url: &str) -> Vec<String> {
    match fetcher.fetch_document(sitemap_url).await {
        Some(body) => match parse_sitemap(&body) {
            SitemapDocument::UrlSet(urls) => urls,
            _ => {
                tracing::debug!("{} is not a URL sitemap", sitemap_url);
                Vec::new()
            }
        },
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::job::PageResult;
    use std::collections::HashMap;

    /// Serves canned documents by URL
    struct StaticFetcher {
        documents: HashMap<String, String>,
    }

    impl StaticFetcher {
        fn new(documents: &[(&str, &str)]) -> Self {
            Self {
                documents: documents
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.to_string()))
                    .collect(),
            }
        }
    }

    impl PageFetcher for StaticFetcher {
        async fn fetch_page(&self, url: &str, depth: u32) -> PageResult {
            PageResult::failed(url, depth, "not used")
        }

        async fn fetch_document(&self, url: &str) -> Option<String> {
            self.documents.get(url).cloned()
        }
    }

    const URLSET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/</loc><lastmod>2024-01-01</lastmod></url>
  <url><loc> https://example.com/about </loc></url>
  <url><loc>https://example.com/blog</loc></url>
</urlset>"#;

    const INDEX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>https://example.com/posts.xml</loc></sitemap>
  <sitemap><loc>https://example.com/pages.xml</loc></sitemap>
</sitemapindex>"#;

    fn base() -> Url {
        Url::parse("https://example.com/start").unwrap()
    }

    #[test]
    fn test_parse_url_set() {
        assert_eq!(
            parse_sitemap(URLSET),
            SitemapDocument::UrlSet(vec![
                "https://example.com/".to_string(),
                "https://example.com/about".to_string(),
                "https://example.com/blog".to_string(),
            ])
        );
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(
            parse_sitemap(INDEX),
            SitemapDocument::Index(vec![
                "https://example.com/posts.xml".to_string(),
                "https://example.com/pages.xml".to_string(),
            ])
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_sitemap("<html><body>Not found</body></html>"), SitemapDocument::Empty);
        assert_eq!(parse_sitemap(""), SitemapDocument::Empty);
    }

    #[test]
    fn test_candidates_use_origin() {
        assert_eq!(
            sitemap_candidates(&base()),
            vec![
                "https://example.com/sitemap.xml",
                "https://example.com/sitemap_index.xml",
                "https://example.com/wp-sitemap.xml",
            ]
        );
    }

    #[tokio::test]
    async fn test_discover_url_set() {
        let fetcher = StaticFetcher::new(&[("https://example.com/sitemap.xml", URLSET)]);
        let urls = discover_sitemap_urls(&fetcher, &base(), 1000).await;
        assert_eq!(urls.len(), 3);
    }

    #[tokio::test]
    async fn test_discover_falls_through_to_later_path() {
        let fetcher = StaticFetcher::new(&[
            ("https://example.com/sitemap.xml", "<html>404</html>"),
            ("https://example.com/wp-sitemap.xml", URLSET),
        ]);
        let urls = discover_sitemap_urls(&fetcher, &base(), 1000).await;
        assert_eq!(urls.len(), 3);
    }

    #[tokio::test]
    async fn test_discover_expands_index_one_level() {
        let fetcher = StaticFetcher::new(&[
            ("https://example.com/sitemap_index.xml", INDEX),
            (
                "https://example.com/posts.xml",
                r#"<urlset><url><loc>https://example.com/p/1</loc></url></urlset>"#,
            ),
            ("https://example.com/pages.xml", INDEX),
        ]);
        let urls = discover_sitemap_urls(&fetcher, &base(), 1000).await;
        assert_eq!(urls, vec!["https://example.com/p/1".to_string()]);
    }

    #[tokio::test]
    async fn test_discover_respects_limit() {
        let fetcher = StaticFetcher::new(&[("https://example.com/sitemap.xml", URLSET)]);
        let urls = discover_sitemap_urls(&fetcher, &base(), 2).await;
        assert_eq!(
            urls,
            vec![
                "https://example.com/".to_string(),
                "https://example.com/about".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_discover_nothing() {
        let fetcher = StaticFetcher::new(&[]);
        assert!(discover_sitemap_urls(&fetcher, &base(), 1000).await.is_empty());
    }
}
