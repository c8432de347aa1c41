use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use intent_agent::service::IntentService;

use crate::{analyze, health, request_log};

#[derive(Clone)]
pub struct AppState {
    pub service: IntentService,
}

pub fn router(service: IntentService) -> Router {
    Router::new()
        .route("/v1/intent/analyze", post(analyze::analyze_intent))
        .route("/v1/health", get(health::health))
        .route("/health", get(health::health))
        .layer(middleware::from_fn(request_log::log_request))
        .with_state(AppState { service })
}
