//! Liveness and readiness probes. Both are mounted outside the API
//! middleware so timeouts and rate limits never fail a probe.

use axum::{extract::State, http::StatusCode, Json};
use clan_service::dto::{HealthResponse, ReadinessResponse};

use crate::state::AppState;

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// GET /ready
///
/// 503 until Postgres answers, and Redis too when it backs the cooldowns.
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let deps = state.dependencies();
    let response = ReadinessResponse::ready(deps.database_ok().await, deps.redis_ok().await);

    let status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}
