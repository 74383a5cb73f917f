//! Route namespace prefixes.
//!
//! # Responsibilities
//! - Validate prefixes before they reach axum (`/`, `{param}` and `*` are rejected)
//! - Normalize a single trailing slash away
//! - Decide overlap and containment on segment boundaries
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - `/api` contains `/api/v2` but not `/apiary`

use std::fmt;

/// Reason a prefix was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid path prefix {prefix:?}: {reason}")]
pub struct InvalidPrefix {
    pub prefix: String,
    pub reason: &'static str,
}

/// A validated route namespace such as `/api` or `/collaboration`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathPrefix(String);

impl PathPrefix {
    /// Parse and normalize a prefix.
    pub fn parse(raw: &str) -> Result<Self, InvalidPrefix> {
        let reject = |reason| InvalidPrefix {
            prefix: raw.to_string(),
            reason,
        };

        if !raw.starts_with('/') {
            return Err(reject("must start with '/'"));
        }

        let trimmed = raw.strip_suffix('/').unwrap_or(raw);
        if trimmed.is_empty() {
            return Err(reject("the root path cannot be claimed as a namespace"));
        }
        if trimmed[1..].split('/').any(str::is_empty) {
            return Err(reject("empty path segment"));
        }
        if trimmed.contains(['{', '}', '*', ':']) {
            return Err(reject("parameters and wildcards are not allowed"));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if `other` equals this prefix or lives underneath it.
    pub fn contains(&self, other: &PathPrefix) -> bool {
        match other.0.strip_prefix(&self.0) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Returns true if a request path could be routed to both prefixes.
    pub fn overlaps(&self, other: &PathPrefix) -> bool {
        self.contains(other) || other.contains(self)
    }
}

impl fmt::Display for PathPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
