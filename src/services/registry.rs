//! Subsystem registry.
//!
//! # Responsibilities
//! - Map each [`ServiceId`] to the subsystem that mounts it
//! - Reject a second registration for the same service
//! - Reject declared namespaces that overlap another subsystem's
//!
//! # Design Decisions
//! - Built once through [`RegistryBuilder`], immutable afterwards
//! - A lookup miss is a wiring defect, not a configuration error

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::http::server::ServerHandle;
use crate::routing::{InvalidPrefix, PathPrefix};
use crate::services::id::ServiceId;

/// A mountable subsystem.
///
/// `mount` must register every route before returning and must only nest
/// routers under the namespace returned by `path_prefix`. Slow initialization
/// belongs in a task started through [`ServerHandle::spawn`].
pub trait Subsystem: Send + Sync {
    fn id(&self) -> ServiceId;

    /// Namespace this subsystem claims, or `None` if it serves no routes.
    fn path_prefix(&self) -> Option<&'static str>;

    fn mount(&self, handle: &mut ServerHandle) -> Result<(), MountError>;
}

/// Failure while mounting a subsystem onto the server handle.
#[derive(Debug, Error)]
pub enum MountError {
    #[error(transparent)]
    InvalidPrefix(#[from] InvalidPrefix),

    #[error("path prefix {prefix} is already claimed by {owner}")]
    PrefixConflict { prefix: String, owner: ServiceId },

    #[error("{service} tried to claim {prefix} outside its declared namespace")]
    UndeclaredPrefix { service: ServiceId, prefix: String },

    #[error("{0} is already mounted")]
    AlreadyMounted(ServiceId),

    #[error("{active} is still mounting")]
    MountInProgress { active: ServiceId },

    #[error("routes and tasks can only be attached while a subsystem is mounting")]
    NotMounting,

    #[error("{0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl MountError {
    /// Wrap a subsystem-specific failure.
    pub fn other<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Other(err.into())
    }
}

/// The resolver produced a service nobody registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no subsystem registered for {service}")]
pub struct UnregisteredServiceError {
    pub service: ServiceId,
}

/// Registration-time defects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("{0} is registered twice")]
    DuplicateService(ServiceId),

    #[error("{service}: {source}")]
    InvalidPrefix {
        service: ServiceId,
        #[source]
        source: InvalidPrefix,
    },

    #[error("{service} namespace {prefix} overlaps {other} namespace {other_prefix}")]
    PrefixOverlap {
        service: ServiceId,
        prefix: String,
        other: ServiceId,
        other_prefix: String,
    },
}

struct Registration {
    subsystem: Arc<dyn Subsystem>,
    namespace: Option<PathPrefix>,
}

/// Immutable `ServiceId` → subsystem table.
pub struct SubsystemRegistry {
    entries: HashMap<ServiceId, Registration>,
}

impl SubsystemRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn lookup(&self, id: ServiceId) -> Result<&Arc<dyn Subsystem>, UnregisteredServiceError> {
        self.entries
            .get(&id)
            .map(|r| &r.subsystem)
            .ok_or(UnregisteredServiceError { service: id })
    }

    /// Validated namespace declared by `id`.
    pub fn namespace(&self, id: ServiceId) -> Option<&PathPrefix> {
        self.entries.get(&id).and_then(|r| r.namespace.as_ref())
    }

    pub fn is_registered(&self, id: ServiceId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for SubsystemRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut services: Vec<_> = self.entries.keys().collect();
        services.sort();
        f.debug_struct("SubsystemRegistry")
            .field("services", &services)
            .finish()
    }
}

/// Collects registrations and checks them as they arrive.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: HashMap<ServiceId, Registration>,
}

impl RegistryBuilder {
    pub fn register<S>(self, subsystem: S) -> Result<Self, RegistryError>
    where
        S: Subsystem + 'static,
    {
        self.register_arc(Arc::new(subsystem))
    }

    pub fn register_arc(mut self, subsystem: Arc<dyn Subsystem>) -> Result<Self, RegistryError> {
        let service = subsystem.id();
        if self.entries.contains_key(&service) {
            return Err(RegistryError::DuplicateService(service));
        }

        let namespace = subsystem
            .path_prefix()
            .map(PathPrefix::parse)
            .transpose()
            .map_err(|source| RegistryError::InvalidPrefix { service, source })?;

        if let Some(prefix) = &namespace {
            let clash = self.entries.iter().find_map(|(other, reg)| {
                reg.namespace
                    .as_ref()
                    .filter(|p| p.overlaps(prefix))
                    .map(|p| (*other, p.to_string()))
            });
            if let Some((other, other_prefix)) = clash {
                return Err(RegistryError::PrefixOverlap {
                    service,
                    prefix: prefix.to_string(),
                    other,
                    other_prefix,
                });
            }
        }

        tracing::debug!(
            service = %service,
            namespace = namespace.as_ref().map(PathPrefix::as_str).unwrap_or("-"),
            "Subsystem registered"
        );
        self.entries.insert(service, Registration { subsystem, namespace });
        Ok(self)
    }

    pub fn build(self) -> SubsystemRegistry {
        SubsystemRegistry {
            entries: self.entries,
        }
    }
}
