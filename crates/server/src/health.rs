use std::collections::BTreeMap;

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::routes::AppState;

pub const SERVICE_NAME: &str = "intent-analyzer";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServingStatus {
    Serving,
    NotServing,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: ServingStatus,
    pub message: String,
    pub details: BTreeMap<String, String>,
}

/// Each call runs a real model probe; there is no cached verdict.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let healthy = state.service.is_healthy().await;

    let details = BTreeMap::from([
        ("timestamp".to_string(), Utc::now().to_rfc3339()),
        ("service".to_string(), SERVICE_NAME.to_string()),
        ("version".to_string(), env!("CARGO_PKG_VERSION").to_string()),
    ]);

    if healthy {
        info!(event_name = "transport.health.serving", "health check passed");
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: ServingStatus::Serving,
                message: "Service is healthy".to_string(),
                details,
            }),
        )
    } else {
        warn!(event_name = "transport.health.not_serving", "health check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: ServingStatus::NotServing,
                message: "Service is unhealthy".to_string(),
                details,
            }),
        )
    }
}
