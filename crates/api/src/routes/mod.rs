//! Route definitions

pub mod payment_intents;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/payment_intents", post(payment_intents::create))
        .route(
            "/subscriptions/{subscription_id}/payment_attempts",
            get(payment_intents::attempt_history),
        )
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
