//! Application handlers
//!
//! Submission by any guild member; listing and review by staff.

use axum::{
    extract::{Query, State},
    Json,
};
use clan_service::dto::{
    ApplicationListQuery, ApplicationListResponse, ApplicationResponse, ReviewApplicationRequest,
    ReviewResponse, SubmitApplicationRequest,
};
use clan_service::services::ApplicationService;

use crate::extractors::{AuthUser, IdPath, StaffUser, ValidatedJson};
use crate::response::{ApiError, ApiResult, Created};
use crate::state::AppState;

/// Submit an application
///
/// POST /applications
pub async fn submit_application(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidatedJson(request): ValidatedJson<SubmitApplicationRequest>,
) -> ApiResult<Created<Json<ApplicationResponse>>> {
    let service = ApplicationService::new(state.service_context());
    let response = service.submit(&caller, request).await?;
    Ok(Created(Json(response)))
}

/// List applications, newest first
///
/// GET /admin/applications?status=
pub async fn list_applications(
    State(state): State<AppState>,
    _staff: StaffUser,
    query: Result<Query<ApplicationListQuery>, axum::extract::rejection::QueryRejection>,
) -> ApiResult<Json<ApplicationListResponse>> {
    let Query(query) = query.map_err(|e| ApiError::invalid_query(e.body_text()))?;
    let service = ApplicationService::new(state.service_context());
    let response = service.list(query.status).await?;
    Ok(Json(response))
}

/// Accept, reject, or retry the roster upsert of an accepted application
///
/// POST /admin/applications/{id}/review
pub async fn review_application(
    State(state): State<AppState>,
    staff: StaffUser,
    IdPath(id): IdPath,
    ValidatedJson(request): ValidatedJson<ReviewApplicationRequest>,
) -> ApiResult<Json<ReviewResponse>> {
    let service = ApplicationService::new(state.service_context());
    let response = service.review(staff.id(), id, request).await?;
    Ok(Json(response))
}
