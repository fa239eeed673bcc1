// src/server/routes.rs

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::error::ApiError;
use super::ScanRequest;
use crate::core::models::ScanResult;
use crate::core::observer::SilentObserver;
use crate::core::scanner::Scanner;

/// `POST /scan`: runs a scan and answers with its result, completed or failed.
pub async fn scan(
    State(scanner): State<Scanner>,
    Json(request): Json<ScanRequest>,
) -> Result<Json<ScanResult>, ApiError> {
    let url = request.required_url().ok_or(ApiError::MissingUrl)?;
    info!(url, "Scan requested over HTTP.");
    Ok(Json(scanner.scan(url, &SilentObserver).await))
}

/// `GET /results`: every stored result.
pub async fn list_results(State(scanner): State<Scanner>) -> Json<Vec<ScanResult>> {
    Json(scanner.store().all().await)
}

/// `GET /results/{url}`: the stored result for a percent-encoded URL.
pub async fn get_result(
    State(scanner): State<Scanner>,
    Path(url): Path<String>,
) -> Result<Json<ScanResult>, ApiError> {
    debug!(url = %url, "Looking up stored result.");
    scanner.store().get(&url).await.map(Json).ok_or(ApiError::NotFound)
}

/// `GET /test`: liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "API is running" }))
}
