//! Audit entries - append-only record of staff actions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    ApplicationSubmitted,
    ApplicationAccepted,
    ApplicationRejected,
    ClanMemberUpsertFailedOnAccept,
    ClanMemberRetryFromAccept,
    ClanMemberAdded,
    ClanMemberUpdated,
    #[serde(rename = "clan_member_resolved_manual")]
    ClanMemberResolved,
    GuildMemberSearch,
    ClanListImported,
    ClanListBulkResolved,
    PromotionQueueBuilt,
    PromotionQueueConfirmed,
    PromotionQueueProcessed,
    PromotionQueueCleared,
    PromotionItemRemoved,
    PromotionItemReset,
}

impl AuditAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApplicationSubmitted => "application_submitted",
            Self::ApplicationAccepted => "application_accepted",
            Self::ApplicationRejected => "application_rejected",
            Self::ClanMemberUpsertFailedOnAccept => "clan_member_upsert_failed_on_accept",
            Self::ClanMemberRetryFromAccept => "clan_member_retry_from_accept",
            Self::ClanMemberAdded => "clan_member_added",
            Self::ClanMemberUpdated => "clan_member_updated",
            Self::ClanMemberResolved => "clan_member_resolved_manual",
            Self::GuildMemberSearch => "guild_member_search",
            Self::ClanListImported => "clan_list_imported",
            Self::ClanListBulkResolved => "clan_list_bulk_resolved",
            Self::PromotionQueueBuilt => "promotion_queue_built",
            Self::PromotionQueueConfirmed => "promotion_queue_confirmed",
            Self::PromotionQueueProcessed => "promotion_queue_processed",
            Self::PromotionQueueCleared => "promotion_queue_cleared",
            Self::PromotionItemRemoved => "promotion_item_removed",
            Self::PromotionItemReset => "promotion_item_reset",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub actor_id: Snowflake,
    pub action: AuditAction,
    pub target_id: Option<Snowflake>,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(actor_id: Snowflake, action: AuditAction) -> Self {
        Self {
            actor_id,
            action,
            target_id: None,
            details: serde_json::Value::Null,
            created_at: Utc::now(),
        }
    }

    pub fn target(mut self, target_id: Snowflake) -> Self {
        self.target_id = Some(target_id);
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}
