use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::{AdminAuth, AuthError};

pub const SESSION_COOKIE: &str = "melcoffee_session";
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Router exposing the login and logout endpoints.
pub fn auth_router(auth: Arc<AdminAuth>) -> Router {
    Router::new()
        .route("/api/login", post(login_handler))
        .route("/api/logout", post(logout_handler))
        .with_state(auth)
}

#[derive(Debug, Default, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenQuery {
    #[serde(default)]
    token: Option<String>,
}

pub(crate) async fn login_handler(State(auth): State<Arc<AdminAuth>>, body: Bytes) -> Response {
    let request: LoginRequest = serde_json::from_slice(&body).unwrap_or_default();

    match auth.login(request.password.as_deref()) {
        Ok(session) => {
            info!("admin session opened");
            let cookie = session_cookie(&session, auth.session_ttl());
            ([(header::SET_COOKIE, cookie)], Json(json!({ "ok": true }))).into_response()
        }
        Err(err @ AuthError::MissingPassword) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": err.to_string() }))).into_response()
        }
        Err(err @ AuthError::InvalidCredentials) => {
            warn!("admin login rejected");
            (StatusCode::UNAUTHORIZED, Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}

pub(crate) async fn logout_handler(
    State(auth): State<Arc<AdminAuth>>,
    headers: HeaderMap,
) -> Response {
    if let Some(session) = session_from_headers(&headers) {
        auth.logout(&session);
        info!("admin session closed");
    }

    let cookie = session_cookie("", Duration::ZERO);
    ([(header::SET_COOKIE, cookie)], Json(json!({ "ok": true }))).into_response()
}

/// Middleware admitting requests that carry the admin token (header or
/// `token` query parameter) or a live admin session cookie.
pub async fn require_admin(
    State(auth): State<Arc<AdminAuth>>,
    request: Request,
    next: Next,
) -> Response {
    if is_authorized(&auth, &request) {
        return next.run(request).await;
    }

    warn!(
        method = %request.method(),
        path = %request.uri().path(),
        "unauthorized admin request"
    );
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "unauthorized" })),
    )
        .into_response()
}

fn is_authorized(auth: &AdminAuth, request: &Request) -> bool {
    let header_token = request
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());
    if header_token.is_some_and(|token| auth.verify_token(token)) {
        return true;
    }

    let query_token = Query::<TokenQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(query)| query.token);
    if query_token.is_some_and(|token| auth.verify_token(&token)) {
        return true;
    }

    session_from_headers(request.headers()).is_some_and(|session| auth.has_session(&session))
}

pub(crate) fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

fn session_cookie(value: &str, max_age: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        max_age.as_secs()
    )
}
