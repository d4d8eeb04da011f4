//! Promotion queue database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for promotion_queue table
#[derive(Debug, Clone, FromRow)]
pub struct PromotionQueueModel {
    pub id: i64,
    pub clan_member_id: i64,
    pub from_rank: String,
    pub to_rank: String,
    pub tenure_days: i64,
    /// queued | confirmed | processed | failed | removed
    pub status: String,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `SELECT status, COUNT(*) ... GROUP BY status`
#[derive(Debug, Clone, FromRow)]
pub struct QueueStatusCountModel {
    pub status: String,
    pub count: i64,
}
