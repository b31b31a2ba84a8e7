//! Cache Policy Module
//!
//! Decides which operations are eligible for caching. The engine itself is
//! agnostic to what it stores; this is the boundary contract for a layer
//! that intercepts calls and serves repeats from the cache.

use regex::Regex;

/// Operation verbs cached by default: the read-only ones.
pub const DEFAULT_CACHEABLE_VERBS: [&str; 3] = ["List", "Get", "Describe"];

// == Cache Policy ==
/// Eligibility rule matched against an operation name.
#[derive(Debug, Clone)]
pub enum CachePolicy {
    /// Cache operations whose name starts with any of these verbs.
    Prefixes(Vec<String>),
    /// Cache operations whose name matches the pattern.
    Pattern(Regex),
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::prefixes(DEFAULT_CACHEABLE_VERBS)
    }
}

impl CachePolicy {
    // == Constructors ==
    /// Policy matching any of the given operation-name prefixes.
    pub fn prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Prefixes(prefixes.into_iter().map(Into::into).collect())
    }

    /// Policy matching operation names against a regular expression.
    pub fn pattern(pattern: Regex) -> Self {
        Self::Pattern(pattern)
    }

    // == Is Cacheable ==
    /// True when the operation should be served through the cache.
    pub fn is_cacheable(&self, operation: &str) -> bool {
        match self {
            Self::Prefixes(prefixes) => {
                prefixes.iter().any(|prefix| operation.starts_with(prefix.as_str()))
            }
            Self::Pattern(regex) => regex.is_match(operation),
        }
    }
}
