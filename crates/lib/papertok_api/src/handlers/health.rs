//! Liveness endpoint.

use crate::models::{ApiResponse, HealthResponse};

/// `GET /health`
pub async fn health_handler() -> ApiResponse<HealthResponse> {
    ApiResponse::ok(HealthResponse {
        status: "ok".into(),
        version: papertok_core::version().into(),
    })
}
