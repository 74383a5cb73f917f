//! Admin subsystem: authenticated management endpoints under `/admin`.
//!
//! - `GET /admin/status`   → version and state
//! - `GET /admin/services` → mount record, read at request time

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};

use crate::config::AdminConfig;
use crate::http::response::not_found;
use crate::http::server::ServerHandle;
use crate::services::{MountError, MountRecord, ServiceId, Subsystem};

use self::auth::admin_auth_middleware;
use self::handlers::{get_services, get_status};

pub const ADMIN_PREFIX: &str = "/admin";

/// State shared by the admin handlers.
#[derive(Debug, Clone)]
pub struct AdminState {
    pub api_key: String,
    pub mounts: MountRecord,
}

#[derive(Debug)]
pub struct AdminService {
    config: AdminConfig,
}

impl AdminService {
    pub fn new(config: AdminConfig) -> Self {
        Self { config }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/services", get(get_services))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

impl Subsystem for AdminService {
    fn id(&self) -> ServiceId {
        ServiceId::Admin
    }

    fn path_prefix(&self) -> Option<&'static str> {
        Some(ADMIN_PREFIX)
    }

    fn mount(&self, handle: &mut ServerHandle) -> Result<(), MountError> {
        if self.config.api_key.is_empty() {
            return Err(MountError::other("admin.api_key is not set"));
        }

        let state = AdminState {
            api_key: self.config.api_key.clone(),
            mounts: handle.mounts().clone(),
        };
        handle.nest(ADMIN_PREFIX, setup_admin_router(state))
    }
}
