//! Console statistics for a finished crawl

use crate::output::CrawlReport;
use crate::state::StatsSnapshot;

/// Formats the statistics block shown at the end of a run
pub fn format_statistics(stats: &StatsSnapshot) -> String {
    let mut out = String::new();

    out.push_str("=== Crawl Statistics ===\n\n");
    out.push_str(&format!("  Pages crawled:          {}\n", stats.pages_crawled));
    out.push_str(&format!("  Links found:            {}\n", stats.pages_found));
    out.push_str(&format!("  External links skipped: {}\n", stats.external_links));
    out.push_str(&format!("  Excluded links:         {}\n", stats.excluded_links));
    out.push_str(&format!("  Errors:                 {}\n", stats.errors));

    if let Some(duration) = stats.duration_secs {
        out.push_str(&format!("  Duration:               {:.1}s\n", duration));
    }
    if let Some(speed) = stats.pages_per_second() {
        out.push_str(&format!("  Speed:                  {:.2} pages/sec\n", speed));
    }

    let processed = stats.pages_processed();
    let success_rate = if processed > 0 {
        (stats.pages_crawled as f64 / processed as f64) * 100.0
    } else {
        0.0
    };
    out.push_str(&format!(
        "\nSuccess Rate: {:.1}% ({} / {} pages fetched without error)\n",
        success_rate, stats.pages_crawled, processed
    ));

    out
}

/// Prints statistics and the depth breakdown to stdout
pub fn print_statistics(report: &CrawlReport) {
    println!("{}", format_statistics(&report.stats));

    let depths = report.depth_breakdown();
    if !depths.is_empty() {
        println!("Pages by Depth:");
        for (depth, count) in depths {
            println!("  {}: {}", depth, count);
        }
        println!();
    }
}
