//! HTML parser for extracting links and metadata
//!
//! This module handles parsing HTML content to extract:
//! - The page title
//! - Every `<a href>` link, resolved to an absolute URL
//!
//! Links are not filtered here. Anything the URL Gate should count as excluded
//! (`mailto:`, `javascript:`, fragment-only anchors) is passed through as
//! written so the gate sees it.

use scraper::{Html, Selector};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// The page title (from the first `<title>` tag)
    pub title: Option<String>,

    /// Links in document order
    pub links: Vec<String>,
}

/// Parses HTML content and extracts the title and links
///
/// # Link Resolution Rules
///
/// - Relative and absolute `http`/`https` hrefs are resolved against
///   `base_url` and have their fragment removed
/// - Fragment-only hrefs (`#top`) are kept verbatim
/// - Hrefs with any other scheme (`mailto:`, `tel:`, `javascript:`) are kept
///   verbatim
/// - Empty and unparsable hrefs are dropped
///
/// # Example
///
/// ```
/// use ripple_crawl::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page#x">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document, base_url),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts every anchor link from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves a link href to the form the URL Gate expects
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with('#') || has_foreign_scheme(href) {
        return Some(href.to_string());
    }

    let mut absolute_url = base_url.join(href).ok()?;
    absolute_url.set_fragment(None);
    Some(absolute_url.to_string())
}

/// True for hrefs like `mailto:x` whose scheme is neither http nor https
fn has_foreign_scheme(href: &str) -> bool {
    match href.split_once(':') {
        Some((scheme, _)) => {
            let is_scheme = !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
            is_scheme
                && !scheme.eq_ignore_ascii_case("http")
                && !scheme.eq_ignore_ascii_case("https")
        }
        None => false,
    }
}
