use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::json;
use xbuckets_core::{RunFunctionRequest, RunFunctionResponse, TracingLogger};

use crate::error::ApiError;
use crate::middleware::RequestId;
use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "function-xbuckets",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub async fn readyz() -> impl IntoResponse {
    // Nothing to wait for: the function holds no connections or caches.
    (StatusCode::OK, Json(HealthResponse { status: "ready" }))
}

/// Decode the request envelope, run the function and return its response.
///
/// Bad composite input still yields 200; only an undecodable envelope is an
/// HTTP error.
pub async fn run_function(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RunFunctionRequest>, JsonRejection>,
) -> Result<Json<RunFunctionResponse>, ApiError> {
    let Json(req) = payload?;

    let log = TracingLogger::new().with_values(&[("request_id", request_id.as_str())]);

    Ok(Json(state.function.run_function(&req, &log)))
}
