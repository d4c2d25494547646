//! Health check

use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    success: bool,
    status: &'static str,
    message: &'static str,
    timestamp: DateTime<Utc>,
}

/// Is the vault up?
///
/// Does not touch storage, only tells the process is serving requests
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        status: "ok",
        message: "Vault API is running!",
        timestamp: Utc::now(),
    })
}
