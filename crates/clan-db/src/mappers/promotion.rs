//! Promotion queue entity <-> model mapper

use clan_core::{PromotionQueueItem, QueueStatus, Rank, Snowflake};

use crate::models::PromotionQueueModel;

/// Rows with an unknown status are read as removed, so they never count as open.
fn parse_status(value: &str) -> QueueStatus {
    QueueStatus::parse(value).unwrap_or(QueueStatus::Removed)
}

impl From<PromotionQueueModel> for PromotionQueueItem {
    fn from(model: PromotionQueueModel) -> Self {
        PromotionQueueItem {
            id: Snowflake::new(model.id),
            member_id: Snowflake::new(model.clan_member_id),
            from_rank: Rank::from_name_or_entry(&model.from_rank),
            to_rank: Rank::from_name_or_entry(&model.to_rank),
            tenure_days: model.tenure_days,
            status: parse_status(&model.status),
            last_error: model.last_error,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// SQL list literal of the open statuses, e.g. `('queued', 'confirmed', 'failed')`
pub fn open_statuses_sql() -> String {
    let quoted: Vec<String> = QueueStatus::OPEN
        .iter()
        .map(|s| format!("'{}'", s.as_str()))
        .collect();
    format!("({})", quoted.join(", "))
}
