//! Liveness endpoint.
//!
//! Reports process liveness only. Store and cache health are deliberately
//! not probed here: the consent pipeline degrades to `Storage` errors per
//! request, and a failing dependency must not take the whole instance out
//! of rotation.

use axum::Json;
use serde::Serialize;

/// Body of GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Identifies which service answered, for shared probe dashboards.
    pub service: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "UP".to_string(),
            service: "consentd".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}
