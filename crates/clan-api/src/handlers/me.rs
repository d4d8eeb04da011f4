//! Caller standing

use axum::{extract::State, Json};
use clan_service::dto::MeResponse;
use clan_service::services::AuthService;

use crate::extractors::AuthUser;
use crate::response::ApiResult;
use crate::state::AppState;

/// GET /me
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<MeResponse>> {
    let response = AuthService::new(state.service_context()).me(&caller).await?;
    Ok(Json(response))
}
