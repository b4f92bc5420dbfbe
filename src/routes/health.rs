use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthData {
    status: &'static str,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthData>) {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthData { status: "ok" })),
        Err(e) => {
            tracing::warn!(error = %e, "health check could not reach the store");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthData { status: "unavailable" }),
            )
        }
    }
}
