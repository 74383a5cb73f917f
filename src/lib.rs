//! Multi-role service host.
//!
//! Resolves a configured list of service names (with aliases and duplicates)
//! into a deduplicated, ordered set and mounts each subsystem exactly once
//! onto a single shared listener.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod security;
pub mod services;
pub mod subsystems;

pub use config::schema::ServerConfig;
pub use http::ServerHandle;
pub use lifecycle::Shutdown;
pub use services::{AliasTable, Composer, ServiceId, ServiceResolver, SubsystemRegistry};
