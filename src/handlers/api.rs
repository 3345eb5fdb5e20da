use axum::{http::StatusCode, response::Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Liveness probe.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "OK" })
}

/// Browsers ask for a favicon on every page load; answer without a body.
pub async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}
