//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → SERVICES env var / --services flag (override the service list)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → shared via Arc with the server handle and subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{
    apply_env_overrides, load_config, parse_service_list, resolve_config, ConfigError,
};
pub use schema::{
    AdminConfig, CollaborationConfig, ListenerConfig, ObservabilityConfig, SecurityConfig,
    ServerConfig, TimeoutConfig, WorkerConfig,
};
pub use validation::{validate_config, ValidationError};
