//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing response:
//!     → headers.rs (add security headers when missing)
//! Incoming request:
//!     → body limit (RequestBodyLimitLayer, applied by the server handle)
//!     → admin routes only: bearer token check (subsystems::admin::auth)
//! ```
//!
//! # Design Decisions
//! - Headers are added only if a handler did not set them
//! - Fail closed: the admin namespace rejects anything without a valid token

pub mod headers;

use axum::Router;

use crate::config::SecurityConfig;

/// Apply the response-hardening layers enabled in `config`.
pub fn apply(router: Router, config: &SecurityConfig) -> Router {
    if config.enable_headers {
        headers::apply(router)
    } else {
        router
    }
}
