use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    /// Always "OK"
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// GET /api/health
///
/// Liveness probe for load balancers; does not touch the store.
pub async fn health_check() -> Json<HealthCheckResponse> {
    tracing::debug!("Health check requested");
    Json(HealthCheckResponse {
        status: "OK".to_string(),
        timestamp: Utc::now(),
    })
}
