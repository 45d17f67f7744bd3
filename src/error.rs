//! Error types.
//!
//! [`ValidationError`] comes out of mock construction. [`ApiError`] is what the
//! HTTP layer turns into a response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// A mock definition was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("'id' is required.")]
    MissingId,

    #[error("'method' is required.")]
    MissingMethod,

    #[error("'responseStatusCode' is required.")]
    MissingStatusCode,

    #[error("Only 'url' or 'urlPattern' can be specified. Not both.")]
    BothUrlAndPattern,

    #[error("One of 'url' or 'urlPattern' must be specified.")]
    NoUrlOrPattern,

    #[error("Invalid 'urlPattern': {0}")]
    InvalidPattern(String),

    #[error("Invalid 'responseStatusCode': {0}")]
    InvalidStatusCode(u16),
}

/// Errors returned by the HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Malformed JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Validation(e) => (StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
            ApiError::MalformedJson(e) => (StatusCode::BAD_REQUEST, "malformed_json", e.to_string()),
        };

        let body = axum::Json(json!({
            "error": kind,
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::MissingId.to_string(), "'id' is required.");
        assert_eq!(
            ValidationError::BothUrlAndPattern.to_string(),
            "Only 'url' or 'urlPattern' can be specified. Not both."
        );
        assert_eq!(
            ValidationError::InvalidStatusCode(42).to_string(),
            "Invalid 'responseStatusCode': 42"
        );
    }

    #[test]
    fn test_status_mapping() {
        let resp = ApiError::NotFound("gone".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = ApiError::from(ValidationError::MissingMethod).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let resp = ApiError::from(parse_err).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
