//! Application database model

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

use clan_core::ApplicationAnswers;

/// Database model for applications table
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationModel {
    pub id: i64,
    pub discord_id: i64,
    pub display_name: String,
    pub answers: Json<ApplicationAnswers>,
    pub status: String,
    pub log_thread_id: Option<i64>,
    pub reviewer_id: Option<i64>,
    pub reviewer_note: Option<String>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub accepted_by: Option<i64>,
    pub denied_at: Option<DateTime<Utc>>,
    pub denied_by: Option<i64>,
    pub deny_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
