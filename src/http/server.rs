//! Shared server handle.
//!
//! # Responsibilities
//! - Own the bound TCP listener and the root Axum router
//! - Let subsystems nest routers and start background tasks while they mount
//! - Stage each mount and commit it atomically (a failed mount leaves nothing behind)
//! - Wire up middleware (tracing, request ID, timeout, body limit, security headers)
//! - Serve until the shutdown signal, then stop background tasks
//!
//! # Design Decisions
//! - `serve` consumes the handle: the route table cannot change once traffic flows
//! - Prefix claims are checked before axum sees them, so `Router::nest` never panics

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::http::request;
use crate::lifecycle::Shutdown;
use crate::net::listener::{self, ListenerError};
use crate::observability::metrics;
use crate::routing::PathPrefix;
use crate::security;
use crate::services::{MountEntry, MountError, MountRecord, ServiceId};

struct BackgroundTask {
    service: ServiceId,
    name: &'static str,
    handle: JoinHandle<()>,
}

/// Routes and tasks attached by the subsystem currently mounting.
struct PendingMount {
    service: ServiceId,
    namespace: Option<PathPrefix>,
    routes: Vec<(PathPrefix, Router)>,
    tasks: Vec<BackgroundTask>,
}

/// The single listener and root dispatcher shared by every mounted subsystem.
pub struct ServerHandle {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: Arc<ServerConfig>,
    router: Router,
    claims: Vec<(PathPrefix, ServiceId)>,
    pending: Option<PendingMount>,
    mounts: MountRecord,
    shutdown: Shutdown,
    tasks: Vec<BackgroundTask>,
}

impl ServerHandle {
    /// Bind the configured address.
    pub async fn bind(config: Arc<ServerConfig>) -> Result<Self, ListenerError> {
        let listener = listener::bind(&config.listener).await?;
        Self::from_listener(listener, config).map_err(ListenerError::Bind)
    }

    /// Wrap an already bound listener.
    pub fn from_listener(
        listener: TcpListener,
        config: Arc<ServerConfig>,
    ) -> Result<Self, std::io::Error> {
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
            config,
            router: Router::new(),
            claims: Vec::new(),
            pending: None,
            mounts: MountRecord::new(),
            shutdown: Shutdown::new(),
            tasks: Vec::new(),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Services mounted so far, shared with anyone who needs to read it later.
    pub fn mounts(&self) -> &MountRecord {
        &self.mounts
    }

    pub fn is_mounted(&self, service: ServiceId) -> bool {
        self.mounts.contains(service)
    }

    /// Service whose claimed prefix overlaps `prefix`, including the mount in progress.
    pub fn claim_owner(&self, prefix: &str) -> Option<ServiceId> {
        let prefix = PathPrefix::parse(prefix).ok()?;
        self.owner_of(&prefix)
    }

    /// Nest `router` under `prefix` for the subsystem currently mounting.
    pub fn nest(&mut self, prefix: &str, router: Router) -> Result<(), MountError> {
        let prefix = PathPrefix::parse(prefix)?;
        let (service, namespace) = match &self.pending {
            Some(p) => (p.service, p.namespace.as_ref()),
            None => return Err(MountError::NotMounting),
        };

        if !namespace.is_some_and(|ns| ns.contains(&prefix)) {
            return Err(MountError::UndeclaredPrefix {
                service,
                prefix: prefix.to_string(),
            });
        }
        if let Some(owner) = self.owner_of(&prefix) {
            return Err(MountError::PrefixConflict {
                prefix: prefix.to_string(),
                owner,
            });
        }

        tracing::debug!(service = %service, prefix = %prefix, "Routes staged");
        if let Some(pending) = self.pending.as_mut() {
            pending.routes.push((prefix, router));
        }
        Ok(())
    }

    /// Start a background task owned by the subsystem currently mounting.
    ///
    /// Tasks should stop when [`ServerHandle::shutdown_signal`] fires.
    pub fn spawn<F>(&mut self, name: &'static str, task: F) -> Result<(), MountError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let pending = self.pending.as_mut().ok_or(MountError::NotMounting)?;
        tracing::debug!(service = %pending.service, task = name, "Background task started");
        pending.tasks.push(BackgroundTask {
            service: pending.service,
            name,
            handle: tokio::spawn(task),
        });
        Ok(())
    }

    /// Receiver that fires once the server stops serving.
    pub fn shutdown_signal(&self) -> broadcast::Receiver<()> {
        self.shutdown.subscribe()
    }

    pub(crate) fn begin_mount(
        &mut self,
        service: ServiceId,
        namespace: Option<PathPrefix>,
    ) -> Result<(), MountError> {
        if let Some(pending) = &self.pending {
            return Err(MountError::MountInProgress {
                active: pending.service,
            });
        }
        if self.mounts.contains(service) {
            return Err(MountError::AlreadyMounted(service));
        }

        self.pending = Some(PendingMount {
            service,
            namespace,
            routes: Vec::new(),
            tasks: Vec::new(),
        });
        Ok(())
    }

    pub(crate) fn commit_mount(&mut self) -> Result<MountEntry, MountError> {
        let pending = self.pending.take().ok_or(MountError::NotMounting)?;
        let entry = MountEntry {
            service: pending.service,
            prefixes: pending.routes.iter().map(|(p, _)| p.to_string()).collect(),
            background_tasks: pending.tasks.len(),
        };

        if self.mounts.insert(entry.clone()).is_err() {
            abort_tasks(pending.tasks);
            return Err(MountError::AlreadyMounted(pending.service));
        }

        for (prefix, routes) in pending.routes {
            self.router = std::mem::take(&mut self.router).nest(prefix.as_str(), routes);
            self.claims.push((prefix, pending.service));
        }
        self.tasks.extend(pending.tasks);

        Ok(entry)
    }

    pub(crate) fn abort_mount(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::warn!(
                service = %pending.service,
                discarded_routes = pending.routes.len(),
                aborted_tasks = pending.tasks.len(),
                "Mount aborted"
            );
            abort_tasks(pending.tasks);
        }
    }

    /// Root dispatcher with every middleware layer applied.
    pub fn app(&self) -> Router {
        let timeouts = &self.config.timeouts;
        let app = self
            .router
            .clone()
            .layer(middleware::from_fn(metrics::track_http));

        let app = security::apply(app, &self.config.security)
            .layer(RequestBodyLimitLayer::new(self.config.security.max_body_size));

        #[allow(deprecated)]
        let app = app.layer(TimeoutLayer::new(Duration::from_secs(timeouts.request_secs)));

        app.layer(request::propagate_layer())
            .layer(TraceLayer::new_for_http())
            .layer(request::set_layer())
    }

    /// Serve until `signal` resolves, then stop background tasks.
    pub async fn serve<F>(mut self, signal: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.abort_mount();
        let app = self.app();
        let Self {
            listener,
            local_addr,
            config,
            mounts,
            shutdown,
            tasks,
            ..
        } = self;

        tracing::info!(
            address = %local_addr,
            services = ?mounts.services(),
            "HTTP server starting"
        );

        let result = axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(signal)
            .await;

        shutdown.trigger();
        drain_tasks(tasks, Duration::from_secs(config.timeouts.shutdown_secs)).await;

        tracing::info!("HTTP server stopped");
        result
    }

    fn owner_of(&self, prefix: &PathPrefix) -> Option<ServiceId> {
        let committed = self
            .claims
            .iter()
            .find(|(claimed, _)| claimed.overlaps(prefix))
            .map(|(_, owner)| *owner);

        committed.or_else(|| {
            self.pending.as_ref().and_then(|p| {
                p.routes
                    .iter()
                    .any(|(claimed, _)| claimed.overlaps(prefix))
                    .then_some(p.service)
            })
        })
    }
}

fn abort_tasks(tasks: Vec<BackgroundTask>) {
    for task in tasks {
        task.handle.abort();
    }
}

async fn drain_tasks(tasks: Vec<BackgroundTask>, grace: Duration) {
    let deadline = tokio::time::Instant::now() + grace;

    for mut task in tasks {
        match tokio::time::timeout_at(deadline, &mut task.handle).await {
            Ok(Ok(())) => {
                tracing::debug!(service = %task.service, task = task.name, "Background task stopped");
            }
            Ok(Err(e)) => {
                tracing::error!(service = %task.service, task = task.name, error = %e, "Background task failed");
            }
            Err(_) => {
                tracing::warn!(service = %task.service, task = task.name, "Background task did not stop in time, aborting");
                task.handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use tower::ServiceExt;

    async fn handle() -> ServerHandle {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        ServerHandle::from_listener(listener, Arc::new(ServerConfig::default())).unwrap()
    }

    fn ns(raw: &str) -> Option<PathPrefix> {
        Some(PathPrefix::parse(raw).unwrap())
    }

    async fn status(app: Router, uri: &str) -> StatusCode {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_nest_requires_active_mount() {
        let mut handle = handle().await;
        let err = handle.nest("/api", Router::new()).unwrap_err();
        assert!(matches!(err, MountError::NotMounting));
    }

    #[tokio::test]
    async fn test_committed_routes_are_served() {
        let mut handle = handle().await;
        handle.begin_mount(ServiceId::Web, ns("/api")).unwrap();
        handle
            .nest("/api", Router::new().route("/ping", get(|| async { "pong" })))
            .unwrap();

        // Staged routes are invisible until commit.
        assert_eq!(status(handle.app(), "/api/ping").await, StatusCode::NOT_FOUND);

        let entry = handle.commit_mount().unwrap();
        assert_eq!(entry.prefixes, vec!["/api".to_string()]);
        assert_eq!(status(handle.app(), "/api/ping").await, StatusCode::OK);
        assert!(handle.is_mounted(ServiceId::Web));
    }

    #[tokio::test]
    async fn test_prefix_outside_namespace_rejected() {
        let mut handle = handle().await;
        handle.begin_mount(ServiceId::Web, ns("/api")).unwrap();

        let err = handle.nest("/admin", Router::new()).unwrap_err();
        assert!(matches!(err, MountError::UndeclaredPrefix { service: ServiceId::Web, .. }));

        handle.abort_mount();
        handle.begin_mount(ServiceId::Worker, None).unwrap();
        assert!(handle.nest("/worker", Router::new()).is_err());
    }

    #[tokio::test]
    async fn test_overlapping_claim_rejected() {
        let mut handle = handle().await;
        handle.begin_mount(ServiceId::Web, ns("/api")).unwrap();
        handle.nest("/api/v1", Router::new()).unwrap();

        let err = handle.nest("/api", Router::new()).unwrap_err();
        assert!(matches!(err, MountError::PrefixConflict { owner: ServiceId::Web, .. }));

        handle.commit_mount().unwrap();
        assert_eq!(handle.claim_owner("/api/v1/users"), Some(ServiceId::Web));
        assert_eq!(handle.claim_owner("/apiary"), None);
    }

    #[tokio::test]
    async fn test_aborted_mount_leaves_nothing() {
        let mut handle = handle().await;
        handle.begin_mount(ServiceId::Web, ns("/api")).unwrap();
        handle
            .nest("/api", Router::new().route("/ping", get(|| async { "pong" })))
            .unwrap();
        handle
            .spawn("idle", std::future::pending::<()>())
            .unwrap();
        handle.abort_mount();

        assert!(!handle.is_mounted(ServiceId::Web));
        assert_eq!(handle.claim_owner("/api"), None);
        assert_eq!(status(handle.app(), "/api/ping").await, StatusCode::NOT_FOUND);

        // The slot is free again.
        handle.begin_mount(ServiceId::Web, ns("/api")).unwrap();
        handle.commit_mount().unwrap();
    }

    #[tokio::test]
    async fn test_second_mount_of_same_service_rejected() {
        let mut handle = handle().await;
        handle.begin_mount(ServiceId::Worker, None).unwrap();
        handle.commit_mount().unwrap();

        let err = handle.begin_mount(ServiceId::Worker, None).unwrap_err();
        assert!(matches!(err, MountError::AlreadyMounted(ServiceId::Worker)));
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let handle = handle().await;
        let response = handle
            .app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.headers().contains_key(request::X_REQUEST_ID));
    }
}
