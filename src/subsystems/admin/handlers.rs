use axum::{extract::State, Json};
use serde::Serialize;

use crate::services::MountEntry;
use crate::subsystems::admin::AdminState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub mounted_services: usize,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        mounted_services: state.mounts.len(),
    })
}

pub async fn get_services(State(state): State<AdminState>) -> Json<Vec<MountEntry>> {
    Json(state.mounts.entries())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{MountRecord, ServiceId};
    use crate::subsystems::admin::setup_admin_router;
    use axum::body::{to_bytes, Body};
    use axum::http::{header::AUTHORIZATION, Request, StatusCode};
    use axum::Router;
    use tower::ServiceExt;

    fn app(mounts: MountRecord) -> Router {
        let state = AdminState {
            api_key: "secret".to_string(),
            mounts,
        };
        Router::new().nest("/admin", setup_admin_router(state))
    }

    fn request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_rejects_missing_or_wrong_token() {
        let app = app(MountRecord::new());

        let res = app.clone().oneshot(request("/admin/status", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = app.oneshot(request("/admin/status", Some("nope"))).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_services_reflect_later_mounts() {
        let mounts = MountRecord::new();
        let app = app(mounts.clone());

        // Entries added after the router was built are visible.
        mounts
            .insert(MountEntry {
                service: ServiceId::Web,
                prefixes: vec!["/api".to_string()],
                background_tasks: 0,
            })
            .unwrap();

        let res = app
            .oneshot(request("/admin/services", Some("secret")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = to_bytes(res.into_body(), 1024 * 1024).await.unwrap();
        let services: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(services[0]["service"], "web");
        assert_eq!(services[0]["prefixes"][0], "/api");
    }
}
