//! Composition driver.
//!
//! # Responsibilities
//! - Mount each resolved service exactly once, in resolved order
//! - Skip services the handle already records (repeat invocation is a no-op)
//! - Stop at the first failure and report which service failed
//!
//! # Design Decisions
//! - Sequential and blocking: mount N returns before mount N+1 starts
//! - No retries, no timeouts; a constructor is expected to return promptly
//! - Already mounted services stay mounted after a failure; the caller decides

use thiserror::Error;

use crate::http::server::ServerHandle;
use crate::observability::metrics;
use crate::services::id::ServiceId;
use crate::services::registry::{MountError, SubsystemRegistry, UnregisteredServiceError};
use crate::services::resolver::ResolvedServiceSet;

/// Composition failure. Earlier mounts remain in place.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error(transparent)]
    Unregistered(#[from] UnregisteredServiceError),

    #[error("failed to mount {service}: {source}")]
    Mount {
        service: ServiceId,
        #[source]
        source: MountError,
    },
}

impl ComposeError {
    /// Service that stopped composition.
    pub fn service(&self) -> ServiceId {
        match self {
            Self::Unregistered(e) => e.service,
            Self::Mount { service, .. } => *service,
        }
    }
}

/// Outcome of one `compose_all` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeReport {
    /// Mounted by this call, in order.
    pub mounted: Vec<ServiceId>,
    /// Already mounted before this call.
    pub skipped: Vec<ServiceId>,
}

/// Drives subsystem mounting against a [`SubsystemRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct Composer<'a> {
    registry: &'a SubsystemRegistry,
}

impl<'a> Composer<'a> {
    pub fn new(registry: &'a SubsystemRegistry) -> Self {
        Self { registry }
    }

    pub fn compose_all(
        &self,
        resolved: &ResolvedServiceSet,
        handle: &mut ServerHandle,
    ) -> Result<ComposeReport, ComposeError> {
        let mut report = ComposeReport::default();

        for &service in resolved {
            if handle.is_mounted(service) {
                tracing::debug!(service = %service, "Already mounted, skipping");
                report.skipped.push(service);
                continue;
            }

            let subsystem = self.registry.lookup(service)?;
            let namespace = self.registry.namespace(service).cloned();
            let mount_err = |source| ComposeError::Mount { service, source };

            handle.begin_mount(service, namespace).map_err(mount_err)?;
            if let Err(source) = subsystem.mount(handle) {
                handle.abort_mount();
                tracing::error!(service = %service, error = %source, "Subsystem failed to mount");
                return Err(mount_err(source));
            }
            let entry = handle.commit_mount().map_err(mount_err)?;

            metrics::record_mount(service);
            tracing::info!(
                service = %service,
                prefixes = ?entry.prefixes,
                background_tasks = entry.background_tasks,
                "Subsystem mounted"
            );
            report.mounted.push(service);
        }

        Ok(report)
    }
}
