//! Audit log database model

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

/// Database model for audit_logs table
#[derive(Debug, Clone, FromRow)]
pub struct AuditLogModel {
    pub id: i64,
    pub actor_id: i64,
    /// Snake-case action name, e.g. `clan_list_imported`
    pub action: String,
    pub target_id: Option<i64>,
    pub details: JsonValue,
    pub created_at: DateTime<Utc>,
}
