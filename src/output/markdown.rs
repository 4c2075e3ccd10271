//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a crawl,
//! including statistics, a depth breakdown, failed pages and the page table.

use crate::output::{CrawlReport, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Failed pages listed before the rest are elided
const MAX_LISTED_ERRORS: usize = 50;

/// Writes a markdown summary of `report` to `output_path`
///
/// # Arguments
///
/// * `report` - The final crawl report
/// * `base_url` - The URL the crawl started from
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_summary(
    report: &CrawlReport,
    base_url: &str,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_summary(report, base_url);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_summary(report: &CrawlReport, base_url: &str) -> String {
    let stats = &report.stats;
    let mut md = String::new();

    md.push_str("# Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Base URL**: {}\n", base_url));
    md.push_str(&format!("- **Started**: {}\n", stats.start_time.to_rfc3339()));
    if let Some(finished) = stats.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = stats.duration_secs {
        md.push_str(&format!(
            "- **Duration**: {:.1} seconds ({:.2} minutes)\n",
            duration,
            duration / 60.0
        ));
    }
    md.push('\n');

    // Counters
    md.push_str("## Statistics\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Pages crawled | {} |\n", stats.pages_crawled));
    md.push_str(&format!("| Links found | {} |\n", stats.pages_found));
    md.push_str(&format!("| External links skipped | {} |\n", stats.external_links));
    md.push_str(&format!("| Excluded links | {} |\n", stats.excluded_links));
    md.push_str(&format!("| Errors | {} |\n", stats.errors));
    if let Some(speed) = stats.pages_per_second() {
        md.push_str(&format!("| Pages per second | {:.2} |\n", speed));
    }
    md.push('\n');

    let depths = report.depth_breakdown();
    if !depths.is_empty() {
        md.push_str("## Depth Breakdown\n\n");
        md.push_str("| Depth | Pages |\n");
        md.push_str("|-------|-------|\n");
        for (depth, count) in &depths {
            md.push_str(&format!("| {} | {} |\n", depth, count));
        }
        md.push('\n');
    }

    let failed: Vec<_> = report.failed_pages().collect();
    if !failed.is_empty() {
        md.push_str("## Errors\n\n");
        md.push_str("| URL | Error |\n");
        md.push_str("|-----|-------|\n");
        for page in failed.iter().take(MAX_LISTED_ERRORS) {
            md.push_str(&format!(
                "| {} | {} |\n",
                page.url,
                escape_cell(page.error.as_deref().unwrap_or(""))
            ));
        }
        if failed.len() > MAX_LISTED_ERRORS {
            md.push_str(&format!(
                "\n... and {} more\n",
                failed.len() - MAX_LISTED_ERRORS
            ));
        }
        md.push('\n');
    }

    if !report.results.is_empty() {
        md.push_str("## Pages\n\n");
        md.push_str("| URL | Status | Depth | Links | Title |\n");
        md.push_str("|-----|--------|-------|-------|-------|\n");

        let mut pages: Vec<_> = report.results.iter().collect();
        pages.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.url.cmp(&b.url)));

        for page in pages {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                page.url,
                page.status_code,
                page.depth,
                page.links.len(),
                escape_cell(&page.title)
            ));
        }
        md.push('\n');
    }

    md
}

/// Keeps free text from breaking the table layout
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
