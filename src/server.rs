//! HTTP dispatcher.
//!
//! Requests under `/mocked-responses` manage the registry. Everything else is
//! an activation request, answered by the first mock that matches it.

use crate::config::LogSettings;
use crate::error::ApiError;
use crate::mock::Mock;
use crate::registry::{AddOutcome, Registry};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Base path of the management API.
pub const MANAGEMENT_PATH: &str = "/mocked-responses";

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub settings: LogSettings,
}

impl AppState {
    pub fn new(registry: Arc<Registry>, settings: LogSettings) -> Self {
        Self { registry, settings }
    }
}

/// Build the router for both the management API and mock activation.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            MANAGEMENT_PATH,
            get(list_mocks)
                .post(create_mock)
                .put(update_mock)
                .delete(clear_mocks),
        )
        .route("/mocked-responses/", any(missing_id))
        .route("/mocked-responses/{*id}", get(get_mock).delete(delete_mock))
        .fallback(activate_mock)
        .with_state(state)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
        .layer(TraceLayer::new_for_http())
}

// ==================== Management ====================

/// GET /mocked-responses
async fn list_mocks(State(state): State<AppState>) -> Json<Vec<Mock>> {
    Json(state.registry.list())
}

/// GET /mocked-responses/{id}
async fn get_mock(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Mock>, ApiError> {
    state
        .registry
        .get(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Mock {} not found", id)))
}

/// POST /mocked-responses
async fn create_mock(State(state): State<AppState>, body: Bytes) -> Result<StatusCode, ApiError> {
    let mock = parse_mock(&body)?;
    let id = mock.id().to_string();

    match state.registry.add(mock) {
        AddOutcome::Inserted => info!(mock_id = %id, "Mock created"),
        AddOutcome::Replaced => info!(mock_id = %id, "Mock replaced"),
    }

    Ok(StatusCode::CREATED)
}

/// PUT /mocked-responses
async fn update_mock(State(state): State<AppState>, body: Bytes) -> Result<StatusCode, ApiError> {
    let mock = parse_mock(&body)?;
    let id = mock.id().to_string();

    if !state.registry.update(mock) {
        return Err(ApiError::NotFound(format!("Mock {} not found", id)));
    }

    info!(mock_id = %id, "Mock updated");
    Ok(StatusCode::OK)
}

/// DELETE /mocked-responses
async fn clear_mocks(State(state): State<AppState>) -> StatusCode {
    state.registry.clear();
    info!("All mocks cleared");
    StatusCode::OK
}

/// DELETE /mocked-responses/{id}
async fn delete_mock(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !state.registry.delete(&id) {
        return Err(ApiError::NotFound(format!("Mock {} not found", id)));
    }

    info!(mock_id = %id, "Mock deleted");
    Ok(StatusCode::OK)
}

/// Any method on /mocked-responses/
async fn missing_id() -> ApiError {
    ApiError::BadRequest("Mock id is missing from the path".to_string())
}

fn parse_mock(body: &[u8]) -> Result<Mock, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("Request body is required".to_string()));
    }
    Mock::from_json(body)
}

// ==================== Activation ====================

/// Anything outside the management API.
async fn activate_mock(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let url = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let body = parse_activation_body(&body);

    match state.registry.find(method.as_str(), url, body.as_ref()) {
        Some(mock) => {
            if state.settings.log_matches {
                info!(
                    mock_id = %mock.id(),
                    method = %method,
                    url = %url,
                    "Request matched mock"
                );
            }
            mock_response(&mock)
        }
        None => {
            if state.settings.log_unmatched {
                warn!(method = %method, url = %url, "No matching mock found");
            }
            ApiError::NotFound("No matching mock found".to_string()).into_response()
        }
    }
}

/// Empty bodies are absent, JSON is parsed, anything else is kept as a string.
fn parse_activation_body(body: &[u8]) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    match serde_json::from_slice(body) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "Activation body is not JSON");
            Some(Value::String(String::from_utf8_lossy(body).into_owned()))
        }
    }
}

fn mock_response(mock: &Mock) -> Response {
    let status = StatusCode::from_u16(mock.response_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    match mock.response_body() {
        Some(body) => (status, Json(body.clone())).into_response(),
        None => status.into_response(),
    }
}
