//! Guild member search for manual resolution

use axum::{
    extract::{Query, State},
    Json,
};
use clan_service::dto::{CandidateListResponse, GuildMemberSearchQuery};
use clan_service::services::DirectoryService;

use crate::extractors::StaffUser;
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /admin/guild-members/search?q=&limit=
pub async fn search_guild_members(
    State(state): State<AppState>,
    staff: StaffUser,
    query: Result<Query<GuildMemberSearchQuery>, axum::extract::rejection::QueryRejection>,
) -> ApiResult<Json<CandidateListResponse>> {
    let Query(query) = query.map_err(|e| ApiError::invalid_query(e.body_text()))?;
    let response = DirectoryService::new(state.service_context())
        .search(staff.id(), query)
        .await?;
    Ok(Json(response))
}
