//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ListenerConfig.bind_address
//!     → listener.rs (parse, bind)
//!     → ServerHandle (single owner for the process lifetime)
//!     → axum::serve (accept loop)
//! ```
//!
//! # Design Decisions
//! - Exactly one listener per process, shared by every subsystem
//! - Bind happens after service resolution, so a bad service list never holds a port

pub mod listener;
