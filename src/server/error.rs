// src/server/error.rs

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Request-level failures of the API.
///
/// A scan that fails is not one of these: it is a valid `ScanResult` and is
/// returned with 200.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("URL is required")]
    MissingUrl,

    #[error("Scan result not found")]
    NotFound,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUrl => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
