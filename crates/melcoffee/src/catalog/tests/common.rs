use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use serde_json::{json, Map, Value};

use crate::auth::{AdminAuth, AdminConfig};
use crate::catalog::repository::{CatalogRepository, RepositoryError};
use crate::catalog::{catalog_router, CatalogItem, CatalogService, CoffeeId};
use crate::recommend::RecommendationEngine;

pub(super) const TOKEN: &str = "tok-test";
pub(super) const PASSWORD: &str = "pw-test";

#[derive(Default)]
pub(super) struct MemoryCatalog {
    pub(super) items: Mutex<Vec<CatalogItem>>,
    pub(super) writes: Mutex<usize>,
}

impl MemoryCatalog {
    pub(super) fn with_items(items: Vec<CatalogItem>) -> Self {
        Self {
            items: Mutex::new(items),
            writes: Mutex::new(0),
        }
    }

    pub(super) fn snapshot(&self) -> Vec<CatalogItem> {
        self.items.lock().expect("catalog mutex poisoned").clone()
    }

    pub(super) fn write_count(&self) -> usize {
        *self.writes.lock().expect("writes mutex poisoned")
    }
}

impl CatalogRepository for MemoryCatalog {
    fn read_all(&self) -> Result<Vec<CatalogItem>, RepositoryError> {
        Ok(self.snapshot())
    }

    fn write_all(&self, items: &[CatalogItem]) -> Result<(), RepositoryError> {
        *self.items.lock().expect("catalog mutex poisoned") = items.to_vec();
        *self.writes.lock().expect("writes mutex poisoned") += 1;
        Ok(())
    }
}

pub(super) struct UnavailableCatalog;

impl CatalogRepository for UnavailableCatalog {
    fn read_all(&self) -> Result<Vec<CatalogItem>, RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }

    fn write_all(&self, _items: &[CatalogItem]) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }
}

pub(super) fn seeded_items() -> Vec<CatalogItem> {
    vec![
        CatalogItem::new(CoffeeId(1))
            .with_name("Iced Flat White")
            .with_tags(["flat white", "iced"])
            .with_popularity(100.0),
        CatalogItem::new(CoffeeId(2))
            .with_name("Long Black")
            .with_tags(["long black", "hot"])
            .with_popularity(0.0),
    ]
}

pub(super) fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

pub(super) fn build_service() -> (Arc<CatalogService<MemoryCatalog>>, Arc<MemoryCatalog>) {
    let repository = Arc::new(MemoryCatalog::with_items(seeded_items()));
    let service = Arc::new(CatalogService::new(
        repository.clone(),
        RecommendationEngine::standard(),
    ));
    (service, repository)
}

pub(super) fn admin_auth() -> Arc<AdminAuth> {
    Arc::new(AdminAuth::new(&AdminConfig {
        password: PASSWORD.to_string(),
        token: TOKEN.to_string(),
        session_ttl: Duration::from_secs(300),
    }))
}

pub(super) fn router_with_memory() -> (axum::Router, Arc<MemoryCatalog>, Arc<AdminAuth>) {
    let (service, repository) = build_service();
    let auth = admin_auth();
    let router = catalog_router(service, auth.clone()).merge(crate::auth::auth_router(auth.clone()));
    (router, repository, auth)
}

pub(super) fn json_request(method: &str, uri: &str, body: Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(&body).expect("body serializes"),
        ))
        .expect("request builds")
}

pub(super) fn empty_object() -> Value {
    json!({})
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
