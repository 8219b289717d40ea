//! HTTP surface of the mock snippet service.

use crate::store::{
    RecordedRequest, Store, WireSnippet, SESSION_ID, SESSION_PASSWORD, SESSION_USER,
};
use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use vaultpaste_core::SESSION_COOKIE_NAME;

/// Behaviour switches for one mock instance.
///
/// Requests without the session cookie are anonymous: creates are bounced to
/// the login page and history/delete answer 401.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockOptions {
    /// Answer history requests with this status instead of the list.
    pub history_status: Option<u16>,
}

#[derive(Clone)]
pub(crate) struct MockState {
    pub(crate) store: Arc<Mutex<Store>>,
    pub(crate) options: MockOptions,
}

impl MockState {
    pub(crate) fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Create payload as the service reads it; `expiryTime` may be any integer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBody {
    content: Option<String>,
    language: Option<String>,
    title: Option<String>,
    expiry_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

const LOGIN_PAGE: &str = "/index.html";
const LOGIN_FAILED: &str = "/index.html?error";
const APP_PAGE: &str = "/app.html";

/// `NAME=value` pair of the one session this mock accepts.
pub(crate) fn session_pair() -> String {
    format!("{}={}", SESSION_COOKIE_NAME, SESSION_ID)
}

fn signed_in(headers: &HeaderMap) -> bool {
    let expected = session_pair();
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .any(|pair| pair.trim() == expected)
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, message.to_string()).into_response()
}

async fn create_snippet(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<CreateBody>,
) -> Response {
    if !signed_in(&headers) {
        return (StatusCode::FOUND, [(header::LOCATION, LOGIN_PAGE)]).into_response();
    }
    let content = body.content.unwrap_or_default();
    if content.is_empty() {
        return error_body(StatusCode::BAD_REQUEST, "Content is required");
    }
    let language = body.language.unwrap_or_else(|| "plaintext".to_string());
    let snippet = state.lock().insert(
        &content,
        &language,
        body.title.as_deref(),
        body.expiry_time,
        Some(SESSION_USER),
    );
    info!(id = %snippet.id, "mock snippet created");
    Json(WireSnippet::from(&snippet)).into_response()
}

async fn get_snippet(State(state): State<MockState>, Path(id): Path<String>) -> Response {
    match state.lock().get(&id) {
        Some(snippet) => Json(WireSnippet::from(snippet)).into_response(),
        None => error_body(StatusCode::NOT_FOUND, "Snippet not found or expired"),
    }
}

async fn snippet_history(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if !signed_in(&headers) {
        return error_body(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    if let Some(status) = state.options.history_status {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return error_body(status, "history unavailable");
    }
    let rows: Vec<WireSnippet> = state
        .lock()
        .history(SESSION_USER)
        .iter()
        .map(WireSnippet::from)
        .collect();
    Json(rows).into_response()
}

async fn delete_snippet(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !signed_in(&headers) {
        return error_body(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    if state.lock().delete(&id, SESSION_USER) {
        info!(id = %id, "mock snippet deleted");
        StatusCode::OK.into_response()
    } else {
        error_body(StatusCode::FORBIDDEN, "Forbidden or Not Found")
    }
}

async fn login_page() -> Html<&'static str> {
    Html("<!doctype html><title>Sign in</title>")
}

async fn app_page() -> Html<&'static str> {
    Html("<!doctype html><title>VaultPaste</title>")
}

async fn login(Form(body): Form<LoginBody>) -> Response {
    if body.username != SESSION_USER || body.password != SESSION_PASSWORD {
        info!(user = %body.username, "mock login refused");
        return (StatusCode::FOUND, [(header::LOCATION, LOGIN_FAILED)]).into_response();
    }
    let cookie = format!("{}; Path=/; HttpOnly", session_pair());
    (
        StatusCode::FOUND,
        [(header::LOCATION, APP_PAGE.to_string()), (header::SET_COOKIE, cookie)],
    )
        .into_response()
}

async fn record_request(State(state): State<MockState>, request: Request, next: Next) -> Response {
    let recorded = {
        let header_value = |name: header::HeaderName| {
            request
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        RecordedRequest {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            cache_control: header_value(header::CACHE_CONTROL),
            pragma: header_value(header::PRAGMA),
        }
    };
    debug!(method = %recorded.method, path = %recorded.path, "mock request");
    state.lock().record(recorded);
    next.run(request).await
}

pub(crate) fn create_router(state: MockState) -> Router {
    Router::new()
        .route("/api/snippets", post(create_snippet))
        .route("/api/snippets/history", get(snippet_history))
        .route("/api/snippets/:id", get(get_snippet))
        .route("/api/snippets/:id", delete(delete_snippet))
        .route(LOGIN_PAGE, get(login_page))
        .route(APP_PAGE, get(app_page))
        .route("/login", post(login))
        .layer(middleware::from_fn_with_state(state.clone(), record_request))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
