//! Service composition subsystem.
//!
//! # Data Flow
//! ```text
//! configured names ["web", "api", "worker"]
//!     → alias.rs (raw name → ServiceId, unknown names are fatal)
//!     → resolver.rs (first-occurrence dedup) → [Web, Worker]
//!     → composer.rs (sequential mount loop)
//!         → registry.rs (ServiceId → Subsystem)
//!         → Subsystem::mount(&mut ServerHandle)
//!         → record.rs (at-most-once MountRecord)
//! ```
//!
//! # Design Decisions
//! - Alias table and registry are built once at startup and never mutated
//! - Both are passed explicitly so composition can be tested with fakes
//! - Mounting is strictly sequential: subsystem N finishes before N+1 starts
//! - A failed mount aborts composition; earlier mounts stay in place

pub mod alias;
pub mod composer;
pub mod id;
pub mod record;
pub mod registry;
pub mod resolver;

pub use alias::{AliasTable, UnknownServiceError};
pub use composer::{ComposeError, ComposeReport, Composer};
pub use id::ServiceId;
pub use record::{MountEntry, MountRecord};
pub use registry::{
    MountError, RegistryBuilder, RegistryError, Subsystem, SubsystemRegistry,
    UnregisteredServiceError,
};
pub use resolver::{ResolvedServiceSet, ServiceResolver};
