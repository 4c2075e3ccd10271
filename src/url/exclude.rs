//! Exclusion patterns for discovered links
//!
//! Exclusions are a flat table of rules. Every rule is evaluated on its own and
//! the results are OR-ed together, so the order of the table never changes
//! whether a URL is excluded.

use crate::state::Counter;
use crate::ConfigError;
use regex::Regex;

/// Built-in exclusions: `(name, pattern)`
const BUILTIN_RULES: &[(&str, &str)] = &[
    (
        "media",
        r"(?i)\.(jpg|jpeg|png|gif|svg|ico|pdf|zip|tar|gz|mp4|mp3|avi|mov|webp|bmp)$",
    ),
    ("asset", r"(?i)\.(css|js|woff|woff2|ttf|eot|otf)$"),
    ("mailto", r"^mailto:"),
    ("tel", r"^tel:"),
    ("javascript", r"^javascript:"),
    ("fragment", r"^#"),
    ("tracking", r"\?.*utm_"),
];

/// A single exclusion rule and the counter a match is charged to
#[derive(Debug, Clone)]
pub struct ExclusionRule {
    pub name: String,
    pub pattern: Regex,
    pub counts_as: Counter,
}

/// The complete set of exclusion rules for a crawl
#[derive(Debug, Clone)]
pub struct ExclusionTable {
    rules: Vec<ExclusionRule>,
}

impl ExclusionTable {
    /// Builds the built-in table plus any user-supplied patterns
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPattern` if an extra pattern is not a valid regex.
    pub fn new(extra_patterns: &[String]) -> Result<Self, ConfigError> {
        let mut rules = Vec::with_capacity(BUILTIN_RULES.len() + extra_patterns.len());

        for (name, pattern) in BUILTIN_RULES {
            rules.push(ExclusionRule {
                name: (*name).to_string(),
                pattern: Regex::new(pattern)
                    .map_err(|e| ConfigError::InvalidPattern(e.to_string()))?,
                counts_as: Counter::ExcludedLinks,
            });
        }

        for pattern in extra_patterns {
            rules.push(ExclusionRule {
                name: format!("custom:{}", pattern),
                pattern: Regex::new(pattern)
                    .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?,
                counts_as: Counter::ExcludedLinks,
            });
        }

        Ok(Self { rules })
    }

    /// Returns the first rule matching `url`, if any
    pub fn matching_rule(&self, url: &str) -> Option<&ExclusionRule> {
        self.rules.iter().find(|rule| rule.pattern.is_match(url))
    }

    /// Returns true if any rule matches `url`
    pub fn is_excluded(&self, url: &str) -> bool {
        self.matching_rule(url).is_some()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
