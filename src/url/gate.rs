//! The URL Gate: one admit/reject decision per discovered link

use crate::state::{Counter, CrawlStats, VisitedSet};
use crate::url::domain::domain_of;
use crate::url::exclude::ExclusionTable;
use std::sync::Arc;

/// Outcome of running a URL through the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Eligible for crawling; when returned by [`UrlGate::admit`] the URL
    /// has also been claimed
    Admitted,
    /// Already claimed or visited in this run
    AlreadySeen,
    /// Host differs from the allowed domain
    External,
    /// Matched an exclusion rule
    Excluded { rule: String, counts_as: Counter },
}

impl Verdict {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted)
    }
}

/// Combines visited tracking, exclusion patterns and the domain allow-list
///
/// Checks run in this order:
/// 1. Already seen (no counter)
/// 2. Exclusion table (charged to the matching rule's counter)
/// 3. Allowed domain, by exact host match (charged to external links)
pub struct UrlGate {
    allowed_domain: String,
    exclusions: ExclusionTable,
    visited: Arc<VisitedSet>,
    stats: Arc<CrawlStats>,
}

impl UrlGate {
    pub fn new(
        allowed_domain: &str,
        exclusions: ExclusionTable,
        visited: Arc<VisitedSet>,
        stats: Arc<CrawlStats>,
    ) -> Self {
        Self {
            allowed_domain: allowed_domain.to_lowercase(),
            exclusions,
            visited,
            stats,
        }
    }

    pub fn allowed_domain(&self) -> &str {
        &self.allowed_domain
    }

    /// Classifies `url` without claiming it or touching any counter
    pub fn evaluate(&self, url: &str) -> Verdict {
        if self.visited.is_known(url) {
            return Verdict::AlreadySeen;
        }

        if let Some(rule) = self.exclusions.matching_rule(url) {
            return Verdict::Excluded {
                rule: rule.name.clone(),
                counts_as: rule.counts_as,
            };
        }

        if !self.is_allowed_domain(url) {
            return Verdict::External;
        }

        Verdict::Admitted
    }

    /// Classifies `url`, applies counter effects, and claims it if admitted
    ///
    /// The claim is an atomic insert-if-absent, so when several workers
    /// admit the same URL concurrently exactly one of them gets
    /// [`Verdict::Admitted`].
    pub fn admit(&self, url: &str) -> Verdict {
        let verdict = self.evaluate(url);

        match &verdict {
            Verdict::Excluded { rule, counts_as } => {
                tracing::trace!("Excluded {} (rule: {})", url, rule);
                self.stats.record(*counts_as);
                verdict
            }
            Verdict::External => {
                tracing::trace!("Skipping external link {}", url);
                self.stats.record(Counter::ExternalLinks);
                verdict
            }
            Verdict::Admitted => {
                if self.visited.claim(url) {
                    Verdict::Admitted
                } else {
                    Verdict::AlreadySeen
                }
            }
            Verdict::AlreadySeen => verdict,
        }
    }

    /// Claims `url` if it is eligible, leaving every counter untouched
    ///
    /// Used to rebuild the frontier from links recorded in a checkpoint,
    /// whose counter effects were already applied in the earlier run.
    pub fn readmit(&self, url: &str) -> bool {
        self.evaluate(url).is_admitted() && self.visited.claim(url)
    }

    fn is_allowed_domain(&self, url: &str) -> bool {
        domain_of(url).is_ok_and(|domain| domain == self.allowed_domain)
    }
}
