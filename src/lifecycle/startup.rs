//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve the configured service list
//! - Build the subsystem registry
//! - Bind the shared listener
//! - Compose every resolved service onto it
//!
//! # Design Decisions
//! - Fail fast: any startup error is returned to the caller
//! - Resolution runs before binding, so an unknown name never holds a port
//! - Subsystems initialize in order, not concurrently

use std::sync::Arc;

use thiserror::Error;

use crate::config::ServerConfig;
use crate::http::server::ServerHandle;
use crate::net::listener::ListenerError;
use crate::services::{
    AliasTable, ComposeError, ComposeReport, Composer, RegistryError, ResolvedServiceSet,
    ServiceResolver, UnknownServiceError,
};
use crate::subsystems;

/// Any failure between configuration and a composed server handle.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    UnknownService(#[from] UnknownServiceError),
    #[error("subsystem registry is inconsistent: {0}")]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Listener(#[from] ListenerError),
    #[error(transparent)]
    Compose(#[from] ComposeError),
}

/// A bound, fully composed server ready to `serve`.
pub struct Started {
    pub handle: ServerHandle,
    pub resolved: ResolvedServiceSet,
    pub report: ComposeReport,
}

/// Resolve, register, bind and compose.
pub async fn start(config: ServerConfig) -> Result<Started, StartupError> {
    let aliases = AliasTable::standard();
    let resolved = ServiceResolver::new(&aliases).resolve_all(config.services.as_slice())?;

    tracing::info!(
        configured = ?config.services,
        resolved = ?resolved.as_slice(),
        "Services resolved"
    );
    if resolved.is_empty() {
        tracing::warn!("No services configured; serving an empty router");
    }

    let config = Arc::new(config);
    let registry = subsystems::standard_registry(&config)?;
    let mut handle = ServerHandle::bind(config).await?;
    let report = Composer::new(&registry).compose_all(&resolved, &mut handle)?;

    tracing::info!(
        address = %handle.local_addr(),
        mounted = ?report.mounted,
        "Composition complete"
    );

    Ok(Started {
        handle,
        resolved,
        report,
    })
}
