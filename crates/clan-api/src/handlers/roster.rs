//! Roster handlers
//!
//! Staff-only listing, edits, spreadsheet import and identity resolution.

use axum::{
    extract::{Query, State},
    Json,
};
use clan_service::dto::{
    BulkResolveResponse, CreateRosterMemberRequest, ImportRequest, ImportResponse,
    ResolveMemberRequest, RosterListQuery, RosterMemberEnvelope, RosterPageResponse,
    UpdateRosterMemberRequest,
};
use clan_service::services::{ImportService, ResolveService, RosterService};

use crate::extractors::{IdPath, JsonBody, StaffUser, ValidatedJson};
use crate::response::{ApiError, ApiResult, Created};
use crate::state::AppState;

/// GET /admin/roster
pub async fn list_roster(
    State(state): State<AppState>,
    _staff: StaffUser,
    query: Result<Query<RosterListQuery>, axum::extract::rejection::QueryRejection>,
) -> ApiResult<Json<RosterPageResponse>> {
    let Query(query) = query.map_err(|e| ApiError::invalid_query(e.body_text()))?;
    let response = RosterService::new(state.service_context()).list(query).await?;
    Ok(Json(response))
}

/// POST /admin/roster
pub async fn create_member(
    State(state): State<AppState>,
    staff: StaffUser,
    ValidatedJson(request): ValidatedJson<CreateRosterMemberRequest>,
) -> ApiResult<Created<Json<RosterMemberEnvelope>>> {
    let response = RosterService::new(state.service_context())
        .create(staff.id(), request)
        .await?;
    Ok(Created(Json(response)))
}

/// PATCH /admin/roster/{id}
pub async fn update_member(
    State(state): State<AppState>,
    staff: StaffUser,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<UpdateRosterMemberRequest>,
) -> ApiResult<Json<RosterMemberEnvelope>> {
    let response = RosterService::new(state.service_context())
        .update(staff.id(), id, request)
        .await?;
    Ok(Json(response))
}

/// POST /admin/roster/import
pub async fn import_roster(
    State(state): State<AppState>,
    staff: StaffUser,
    JsonBody(request): JsonBody<ImportRequest>,
) -> ApiResult<Json<ImportResponse>> {
    let response = ImportService::new(state.service_context())
        .import(staff.id(), request)
        .await?;
    Ok(Json(response))
}

/// POST /admin/roster/bulk-resolve
pub async fn bulk_resolve(
    State(state): State<AppState>,
    staff: StaffUser,
) -> ApiResult<Json<BulkResolveResponse>> {
    let response = ResolveService::new(state.service_context())
        .bulk_resolve(staff.id())
        .await?;
    Ok(Json(response))
}

/// POST /admin/roster/{id}/resolve
pub async fn resolve_member(
    State(state): State<AppState>,
    staff: StaffUser,
    IdPath(id): IdPath,
    JsonBody(request): JsonBody<ResolveMemberRequest>,
) -> ApiResult<Json<RosterMemberEnvelope>> {
    let response = ResolveService::new(state.service_context())
        .resolve_manual(staff.id(), id, request)
        .await?;
    Ok(Json(response))
}
