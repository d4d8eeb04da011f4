//! Promotion queue handlers
//!
//! build -> confirm -> process, plus the per-item remove and retry.

use axum::{extract::State, Json};
use clan_service::dto::{
    BuildQueueResponse, ClearQueueRequest, ClearQueueResponse, ConfirmQueueResponse,
    ProcessQueueResponse, PromotionQueueResponse, QueueItemEnvelope,
};
use clan_service::services::PromotionService;

use crate::extractors::{IdPath, JsonBody, StaffUser};
use crate::response::ApiResult;
use crate::state::AppState;

/// GET /admin/promotions
pub async fn list_queue(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> ApiResult<Json<PromotionQueueResponse>> {
    let response = PromotionService::new(state.service_context()).list().await?;
    Ok(Json(response))
}

/// POST /admin/promotions/build
pub async fn build_queue(
    State(state): State<AppState>,
    staff: StaffUser,
) -> ApiResult<Json<BuildQueueResponse>> {
    let response = PromotionService::new(state.service_context())
        .build(staff.id())
        .await?;
    Ok(Json(response))
}

/// POST /admin/promotions/confirm
pub async fn confirm_queue(
    State(state): State<AppState>,
    staff: StaffUser,
) -> ApiResult<Json<ConfirmQueueResponse>> {
    let response = PromotionService::new(state.service_context())
        .confirm(staff.id())
        .await?;
    Ok(Json(response))
}

/// POST /admin/promotions/process
pub async fn process_queue(
    State(state): State<AppState>,
    staff: StaffUser,
) -> ApiResult<Json<ProcessQueueResponse>> {
    let response = PromotionService::new(state.service_context())
        .process(staff.id())
        .await?;
    Ok(Json(response))
}

/// POST /admin/promotions/clear with `{"confirm": true}`
pub async fn clear_queue(
    State(state): State<AppState>,
    staff: StaffUser,
    body: Option<JsonBody<ClearQueueRequest>>,
) -> ApiResult<Json<ClearQueueResponse>> {
    let request = body.map(|JsonBody(r)| r).unwrap_or_default();
    let response = PromotionService::new(state.service_context())
        .clear(staff.id(), request)
        .await?;
    Ok(Json(response))
}

/// POST /admin/promotions/{id}/remove
pub async fn remove_item(
    State(state): State<AppState>,
    staff: StaffUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<QueueItemEnvelope>> {
    let response = PromotionService::new(state.service_context())
        .remove(staff.id(), id)
        .await?;
    Ok(Json(response))
}

/// POST /admin/promotions/{id}/retry
pub async fn retry_item(
    State(state): State<AppState>,
    staff: StaffUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<QueueItemEnvelope>> {
    let response = PromotionService::new(state.service_context())
        .retry(staff.id(), id)
        .await?;
    Ok(Json(response))
}
