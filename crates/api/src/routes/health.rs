//! Health check endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health — liveness of the checkout API itself. Does not probe the
/// order-of-record system or the payment gateway.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
