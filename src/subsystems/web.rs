//! Web subsystem: the HTTP API under `/api`.
//!
//! Only the mount contract lives here. Unmatched paths inside the namespace
//! answer with a JSON 404 so a live-but-unknown endpoint is distinguishable
//! from an unmounted API.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::http::response::not_found;
use crate::http::server::ServerHandle;
use crate::services::{MountError, ServiceId, Subsystem};

pub const API_PREFIX: &str = "/api";

#[derive(Debug, Default)]
pub struct WebService;

impl WebService {
    pub fn new() -> Self {
        Self
    }

    fn router() -> Router {
        Router::new()
            .route("/health", get(health))
            .fallback(not_found)
    }
}

impl Subsystem for WebService {
    fn id(&self) -> ServiceId {
        ServiceId::Web
    }

    fn path_prefix(&self) -> Option<&'static str> {
        Some(API_PREFIX)
    }

    fn mount(&self, handle: &mut ServerHandle) -> Result<(), MountError> {
        handle.nest(API_PREFIX, Self::router())
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
