//! Mountable subsystems.
//!
//! | service         | namespace        | background task |
//! |-----------------|------------------|-----------------|
//! | `web` (`api`)   | `/api`           | -               |
//! | `worker`        | -                | heartbeat loop  |
//! | `collaboration` | `/collaboration` | -               |
//! | `admin`         | `/admin`         | -               |

pub mod admin;
pub mod collaboration;
pub mod web;
pub mod worker;

use crate::config::ServerConfig;
use crate::services::{RegistryError, SubsystemRegistry};

pub use admin::AdminService;
pub use collaboration::CollaborationService;
pub use web::WebService;
pub use worker::WorkerService;

/// Registry wiring every subsystem this build ships.
pub fn standard_registry(config: &ServerConfig) -> Result<SubsystemRegistry, RegistryError> {
    Ok(SubsystemRegistry::builder()
        .register(WebService::new())?
        .register(WorkerService::new(config.worker.clone()))?
        .register(CollaborationService::new(config.collaboration.clone()))?
        .register(AdminService::new(config.admin.clone()))?
        .build())
}
