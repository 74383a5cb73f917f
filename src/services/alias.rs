//! Raw service name → canonical identifier lookup.
//!
//! | configured name | mounts          |
//! |-----------------|-----------------|
//! | `web`, `api`    | `web`           |
//! | `worker`        | `worker`        |
//! | `collaboration` | `collaboration` |
//! | `admin`         | `admin`         |

use std::collections::HashMap;

use thiserror::Error;

use crate::services::id::ServiceId;

/// A configured name matched neither a canonical identifier nor an alias.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown service \"{raw}\" (known services: {known})")]
pub struct UnknownServiceError {
    /// The offending value exactly as configured.
    pub raw: String,
    /// Comma-separated list of accepted names.
    pub known: String,
}

/// Immutable mapping from configured names to [`ServiceId`].
#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: HashMap<&'static str, ServiceId>,
}

impl AliasTable {
    /// The documented table: every canonical name maps to itself, `api` maps to `web`.
    pub fn standard() -> Self {
        let mut entries: HashMap<&'static str, ServiceId> = ServiceId::ALL
            .iter()
            .map(|id| (id.as_str(), *id))
            .collect();
        entries.insert("api", ServiceId::Web);

        Self { entries }
    }

    /// Resolve a configured name. Matching is exact.
    pub fn resolve(&self, raw: &str) -> Result<ServiceId, UnknownServiceError> {
        self.entries
            .get(raw)
            .copied()
            .ok_or_else(|| UnknownServiceError {
                raw: raw.to_string(),
                known: self.names().join(", "),
            })
    }

    /// All accepted names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Non-canonical names that resolve to `id`.
    pub fn aliases_of(&self, id: ServiceId) -> Vec<&'static str> {
        let mut aliases: Vec<_> = self
            .entries
            .iter()
            .filter(|(name, target)| **target == id && **name != id.as_str())
            .map(|(name, _)| *name)
            .collect();
        aliases.sort_unstable();
        aliases
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::standard()
    }
}
