use std::num::NonZeroUsize;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::error;

use super::domain::CoffeeId;
use super::repository::CatalogRepository;
use super::service::{CatalogService, CatalogServiceError};
use crate::auth::{require_admin, AdminAuth};
use crate::recommend::PreferenceAnswers;

/// Router exposing the public catalog, the recommendation endpoint, and the
/// admin-only mutations.
pub fn catalog_router<R>(service: Arc<CatalogService<R>>, auth: Arc<AdminAuth>) -> Router
where
    R: CatalogRepository + 'static,
{
    let admin = middleware::from_fn_with_state(auth, require_admin);

    Router::new()
        .route(
            "/api/coffee",
            get(list_handler::<R>).merge(post(create_handler::<R>).route_layer(admin.clone())),
        )
        .route(
            "/api/coffee/:id",
            put(update_handler::<R>)
                .delete(delete_handler::<R>)
                .route_layer(admin),
        )
        .route("/api/recommend", post(recommend_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RecommendParams {
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

pub(crate) async fn list_handler<R>(State(service): State<Arc<CatalogService<R>>>) -> Response
where
    R: CatalogRepository + 'static,
{
    match service.list() {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(err) => service_error(err),
    }
}

pub(crate) async fn recommend_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    params: Result<Query<RecommendParams>, QueryRejection>,
    body: Bytes,
) -> Response
where
    R: CatalogRepository + 'static,
{
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return client_error(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    let limit = match params.limit {
        Some(raw) => match NonZeroUsize::new(raw) {
            Some(limit) => Some(limit),
            None => {
                return client_error(StatusCode::BAD_REQUEST, "limit must be a positive integer")
            }
        },
        None => None,
    };

    let answers = match parse_answers(&body) {
        Ok(answers) => answers,
        Err(message) => return client_error(StatusCode::BAD_REQUEST, message),
    };

    match service.recommend(&answers, limit) {
        Ok(results) => (StatusCode::OK, Json(results)).into_response(),
        Err(err) => service_error(err),
    }
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Response
where
    R: CatalogRepository + 'static,
{
    let Json(fields) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return client_error(rejection.status(), rejection.body_text()),
    };

    match service.create(fields) {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(err) => service_error(err),
    }
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Response
where
    R: CatalogRepository + 'static,
{
    let Some(id) = parse_id(&raw_id) else {
        return client_error(StatusCode::NOT_FOUND, "not found");
    };
    let Json(patch) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return client_error(rejection.status(), rejection.body_text()),
    };

    match service.update(id, patch) {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(err) => service_error(err),
    }
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(raw_id): Path<String>,
) -> Response
where
    R: CatalogRepository + 'static,
{
    // Deleting an unknown or malformed id is a no-op.
    let Some(id) = parse_id(&raw_id) else {
        return (StatusCode::OK, Json(json!({ "ok": true }))).into_response();
    };

    match service.delete(id) {
        Ok(_) => (StatusCode::OK, Json(json!({ "ok": true }))).into_response(),
        Err(err) => service_error(err),
    }
}

/// An empty body is an empty answer set; anything else must be a JSON object.
fn parse_answers(body: &[u8]) -> Result<PreferenceAnswers, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(PreferenceAnswers::default());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => serde_json::from_value(value)
            .map_err(|err| format!("invalid answers: {err}")),
        Ok(_) => Err("answers must be a JSON object".to_string()),
        Err(err) => Err(format!("invalid JSON body: {err}")),
    }
}

fn parse_id(raw: &str) -> Option<CoffeeId> {
    raw.trim().parse::<u64>().ok().map(CoffeeId)
}

fn client_error(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({ "error": message.into() });
    (status, Json(payload)).into_response()
}

fn service_error(err: CatalogServiceError) -> Response {
    match err {
        CatalogServiceError::NotFound(_) => client_error(StatusCode::NOT_FOUND, "not found"),
        CatalogServiceError::InvalidItem(_) => {
            client_error(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        CatalogServiceError::Repository(_) => {
            error!(error = %err, "catalog repository failure");
            client_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}
