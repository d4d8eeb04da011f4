//! Route definitions
//!
//! Caller routes under /api/v1, staff routes under /api/v1/admin.

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers::{applications, guild_members, health, me, promotions, roster};
use crate::state::AppState;

/// Create the main API router (health routes are mounted separately)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes, kept outside rate limiting
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me::get_me))
        .route("/applications", post(applications::submit_application))
        .nest("/admin", admin_routes())
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .merge(application_routes())
        .merge(roster_routes())
        .merge(promotion_routes())
        .route(
            "/guild-members/search",
            get(guild_members::search_guild_members),
        )
}

fn application_routes() -> Router<AppState> {
    Router::new()
        .route("/applications", get(applications::list_applications))
        .route("/applications/:id/review", post(applications::review_application))
}

fn roster_routes() -> Router<AppState> {
    Router::new()
        .route("/roster", get(roster::list_roster).post(roster::create_member))
        .route("/roster/import", post(roster::import_roster))
        .route("/roster/bulk-resolve", post(roster::bulk_resolve))
        .route("/roster/:id", patch(roster::update_member))
        .route("/roster/:id/resolve", post(roster::resolve_member))
}

fn promotion_routes() -> Router<AppState> {
    Router::new()
        .route("/promotions", get(promotions::list_queue))
        .route("/promotions/build", post(promotions::build_queue))
        .route("/promotions/confirm", post(promotions::confirm_queue))
        .route("/promotions/process", post(promotions::process_queue))
        .route("/promotions/clear", post(promotions::clear_queue))
        .route("/promotions/:id/remove", post(promotions::remove_item))
        .route("/promotions/:id/retry", post(promotions::retry_item))
}
