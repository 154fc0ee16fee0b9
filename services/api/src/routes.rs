use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use melcoffee::auth::{auth_router, AdminAuth};
use melcoffee::catalog::{catalog_router, CatalogRepository, CatalogService};
use serde_json::json;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};

/// Catalog, auth, and operational routes, with the public directory as the
/// fallback for everything else.
pub(crate) fn app_router<R>(
    service: Arc<CatalogService<R>>,
    auth: Arc<AdminAuth>,
    public_dir: &Path,
) -> Router
where
    R: CatalogRepository + 'static,
{
    catalog_router(service, auth.clone())
        .merge(auth_router(auth))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route_service("/admin", ServeFile::new(public_dir.join("admin.html")))
        .fallback_service(ServeDir::new(public_dir))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
