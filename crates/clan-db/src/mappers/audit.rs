//! Audit entry <-> model mapper

use clan_core::{AuditAction, AuditEntry, Snowflake};

use crate::models::AuditLogModel;

/// Rows whose action is no longer known are skipped
impl TryFrom<AuditLogModel> for AuditEntry {
    type Error = String;

    fn try_from(model: AuditLogModel) -> Result<Self, Self::Error> {
        let action: AuditAction =
            serde_json::from_value(serde_json::Value::String(model.action.clone()))
                .map_err(|_| model.action.clone())?;

        Ok(AuditEntry {
            actor_id: Snowflake::new(model.actor_id),
            action,
            target_id: model.target_id.map(Snowflake::new),
            details: model.details,
            created_at: model.created_at,
        })
    }
}
