//! Routing namespace subsystem.
//!
//! # Data Flow
//! ```text
//! Subsystem declares namespace ("/collaboration")
//!     → prefix.rs (validate, normalize)
//!     → Registry (namespaces must not overlap)
//!     → ServerHandle::nest (claims must stay inside the namespace)
//!     → axum Router::nest
//! ```
//!
//! # Design Decisions
//! - Prefixes are validated once and carried as `PathPrefix`
//! - Overlap is segment-aware: `/api` and `/apiary` never collide
//! - No parameters or wildcards in prefixes (axum `nest` would reject them)

pub mod prefix;

pub use prefix::{InvalidPrefix, PathPrefix};
