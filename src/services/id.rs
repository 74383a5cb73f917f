//! Canonical service identifiers.

use std::fmt;

use serde::Serialize;

/// The closed set of subsystems this process knows how to mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceId {
    /// HTTP API (`/api`). Also reachable through the `api` alias.
    Web,
    /// Background job loop. Claims no routes.
    Worker,
    /// Real-time document collaboration over WebSocket (`/collaboration`).
    Collaboration,
    /// Authenticated management endpoints (`/admin`).
    Admin,
}

impl ServiceId {
    pub const ALL: [ServiceId; 4] = [
        ServiceId::Web,
        ServiceId::Worker,
        ServiceId::Collaboration,
        ServiceId::Admin,
    ];

    /// Canonical configuration name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Worker => "worker",
            Self::Collaboration => "collaboration",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
