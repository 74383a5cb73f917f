//! Failure injection: subsystems that misbehave while mounting.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use reqwest::StatusCode;
use service_host::config::AdminConfig;
use service_host::lifecycle::{self, StartupError};
use service_host::services::{ComposeError, MountError, ServiceResolver, Subsystem};
use service_host::subsystems::{AdminService, WebService};
use service_host::{AliasTable, Composer, ServerHandle, ServiceId, SubsystemRegistry};

mod common;

/// Mounts a route, spawns a task, then fails.
struct Flaky;

impl Subsystem for Flaky {
    fn id(&self) -> ServiceId {
        ServiceId::Collaboration
    }

    fn path_prefix(&self) -> Option<&'static str> {
        Some("/collaboration")
    }

    fn mount(&self, handle: &mut ServerHandle) -> Result<(), MountError> {
        handle.nest("/collaboration", Router::new().route("/ping", get(|| async { "pong" })))?;
        handle.spawn("flaky-task", std::future::pending::<()>())?;
        Err(MountError::other("upstream store unavailable"))
    }
}

/// Tries to claim a namespace it never declared.
struct Squatter;

impl Subsystem for Squatter {
    fn id(&self) -> ServiceId {
        ServiceId::Worker
    }

    fn path_prefix(&self) -> Option<&'static str> {
        None
    }

    fn mount(&self, handle: &mut ServerHandle) -> Result<(), MountError> {
        handle.nest("/api/jobs", Router::new())
    }
}

async fn bind() -> ServerHandle {
    let config = common::test_config(&[]);
    ServerHandle::bind(Arc::new(config)).await.unwrap()
}

fn resolve(names: &[&str]) -> service_host::services::ResolvedServiceSet {
    ServiceResolver::new(&AliasTable::standard())
        .resolve_all(names)
        .unwrap()
}

#[tokio::test]
async fn test_failed_mount_leaves_no_routes_behind() {
    let registry = SubsystemRegistry::builder()
        .register(WebService::new())
        .unwrap()
        .register(Flaky)
        .unwrap()
        .build();
    let mut handle = bind().await;

    let err = Composer::new(&registry)
        .compose_all(&resolve(&["web", "collaboration"]), &mut handle)
        .unwrap_err();
    assert_eq!(err.service(), ServiceId::Collaboration);
    assert!(matches!(err, ComposeError::Mount { .. }));

    assert_eq!(handle.mounts().services(), vec![ServiceId::Web]);

    // The host still serves what did mount.
    let host = common::spawn_host(handle);
    let client = common::client();
    let res = client.get(host.url("/api/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let res = client.get(host.url("/collaboration/ping")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // The discarded task is not awaited at shutdown.
    host.stop().await;
}

#[tokio::test]
async fn test_undeclared_namespace_rejected() {
    let registry = SubsystemRegistry::builder()
        .register(WebService::new())
        .unwrap()
        .register(Squatter)
        .unwrap()
        .build();
    let mut handle = bind().await;

    let err = Composer::new(&registry)
        .compose_all(&resolve(&["web", "worker"]), &mut handle)
        .unwrap_err();

    match err {
        ComposeError::Mount {
            service: ServiceId::Worker,
            source: MountError::UndeclaredPrefix { prefix, .. },
        } => assert_eq!(prefix, "/api/jobs"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(handle.claim_owner("/api"), Some(ServiceId::Web));
}

#[tokio::test]
async fn test_unregistered_service_reported() {
    let registry = SubsystemRegistry::builder()
        .register(AdminService::new(AdminConfig {
            api_key: "k".to_string(),
        }))
        .unwrap()
        .build();
    let mut handle = bind().await;

    let err = Composer::new(&registry)
        .compose_all(&resolve(&["admin", "api"]), &mut handle)
        .unwrap_err();

    assert!(matches!(err, ComposeError::Unregistered(_)));
    assert_eq!(err.service(), ServiceId::Web);
    assert!(handle.is_mounted(ServiceId::Admin));
}

#[tokio::test]
async fn test_admin_without_key_fails_startup() {
    let mut config = common::test_config(&["web", "admin"]);
    config.admin.api_key.clear();

    match lifecycle::start(config).await {
        Err(StartupError::Compose(e)) => assert_eq!(e.service(), ServiceId::Admin),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("admin mounted without a key"),
    }
}
