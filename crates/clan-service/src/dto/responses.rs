//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.
//! Field names follow the admin dashboard's wire format (`discord_id`,
//! `has_420_tag`, `promote_eligible`).

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use clan_core::{
    ApplicationAnswers, ApplicationStatus, MemberSource, MemberStatus, QueueStatus, Rank,
    ResolutionStatus, Snowflake,
};
use serde::Serialize;

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub discord_id: Snowflake,
    pub username: Option<String>,
    pub avatar: Option<String>,
    pub in_guild: bool,
    pub is_staff: bool,
    pub is_member: bool,
    pub application: Option<ApplicationSummary>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationSummary {
    pub id: Snowflake,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Applications
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ApplicationResponse {
    pub id: Snowflake,
    pub discord_id: Snowflake,
    pub display_name: String,
    pub answers: ApplicationAnswers,
    pub status: ApplicationStatus,
    pub log_thread_id: Option<Snowflake>,
    pub reviewer_id: Option<Snowflake>,
    pub reviewer_note: Option<String>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub accepted_by: Option<Snowflake>,
    pub denied_at: Option<DateTime<Utc>>,
    pub denied_by: Option<Snowflake>,
    pub deny_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationListResponse {
    pub applications: Vec<ApplicationResponse>,
}

/// Outcome of a review action. Role and roster steps are reported
/// separately so a failed step can be retried on its own.
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub ok: bool,
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_assigned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_removed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clan_member_upsert_ok: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clan_member_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clan_member_id: Option<Snowflake>,
}

impl ReviewResponse {
    pub fn rejected() -> Self {
        Self {
            ok: true,
            status: ApplicationStatus::Rejected,
            role_assigned: None,
            role_removed: None,
            clan_member_upsert_ok: None,
            clan_member_error: None,
            clan_member_id: None,
        }
    }
}

// ============================================================================
// Roster
// ============================================================================

/// Roster row with derived fields recomputed at response time
#[derive(Debug, Serialize)]
pub struct RosterMemberResponse {
    pub id: Snowflake,
    pub discord_id: Option<Snowflake>,
    pub discord_name: String,
    pub ign: String,
    pub uid: Option<String>,
    pub status: MemberStatus,
    pub has_420_tag: bool,
    pub join_date: NaiveDate,
    pub frozen_days: i64,
    pub counting_since: Option<DateTime<Utc>>,
    pub time_in_clan_days: i64,
    pub rank_current: Rank,
    pub rank_next: Option<Rank>,
    pub promote_eligible: bool,
    pub promote_reason: Option<String>,
    pub needs_resolution: bool,
    pub resolution_status: ResolutionStatus,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<Snowflake>,
    pub source: MemberSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RosterPageResponse {
    pub members: Vec<RosterMemberResponse>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub promotion_due_count: usize,
    pub unresolved_count: usize,
}

#[derive(Debug, Serialize)]
pub struct RosterMemberEnvelope {
    pub ok: bool,
    pub member: RosterMemberResponse,
}

impl RosterMemberEnvelope {
    pub fn new(member: RosterMemberResponse) -> Self {
        Self { ok: true, member }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct ImportResponse {
    pub ok: bool,
    pub imported: usize,
    pub updated: usize,
    pub unresolved: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ResolveDetail {
    pub discord_name: String,
    pub result: String,
}

#[derive(Debug, Default, Serialize)]
pub struct BulkResolveResponse {
    pub ok: bool,
    pub total_checked: usize,
    pub resolved: usize,
    pub skipped: usize,
    pub ambiguous: usize,
    pub not_found: usize,
    pub db_errors: usize,
    /// Set when the directory walk stopped early
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory_error: Option<String>,
    pub details: Vec<ResolveDetail>,
}

// ============================================================================
// Guild member search
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CandidateResponse {
    pub label: String,
    pub sublabel: String,
    /// Short-lived signed handle for the candidate's platform id
    pub resolve_token: String,
}

#[derive(Debug, Serialize)]
pub struct CandidateListResponse {
    pub candidates: Vec<CandidateResponse>,
}

// ============================================================================
// Promotion queue
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PromotionItemResponse {
    pub id: Snowflake,
    pub clan_member_id: Snowflake,
    pub discord_id: Option<Snowflake>,
    pub discord_name: Option<String>,
    pub ign: Option<String>,
    pub from_rank: Rank,
    pub to_rank: Rank,
    pub tenure_days: i64,
    pub status: QueueStatus,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PromotionQueueResponse {
    pub items: Vec<PromotionItemResponse>,
    pub counts: BTreeMap<&'static str, i64>,
    pub confirm_threshold: usize,
    /// Queued items with a platform identity
    pub confirmable_count: usize,
    pub remaining_to_threshold: usize,
    /// Queued items that cannot be confirmed until resolved
    pub unresolved_count: usize,
}

#[derive(Debug, Serialize)]
pub struct BuildQueueResponse {
    pub ok: bool,
    pub queued_added_count: usize,
    pub total_queued_count: i64,
}

#[derive(Debug, Serialize)]
pub struct ConfirmQueueResponse {
    pub ok: bool,
    pub confirmed_count: usize,
    pub unresolved_skipped: usize,
}

#[derive(Debug, Serialize)]
pub struct ProcessQueueResponse {
    pub ok: bool,
    pub processed_count: usize,
    pub failed_count: usize,
    /// Closed without changes because the member already held the rank
    pub skipped_count: usize,
    pub announcement_posted: bool,
}

#[derive(Debug, Serialize)]
pub struct ClearQueueResponse {
    pub ok: bool,
    pub cleared_count: u64,
}

#[derive(Debug, Serialize)]
pub struct QueueItemEnvelope {
    pub ok: bool,
    pub item: PromotionItemResponse,
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: bool,
    /// `None` when no Redis backend is configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis: Option<bool>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

impl ReadinessResponse {
    pub fn ready(database: bool, redis: Option<bool>) -> Self {
        let healthy = database && redis.unwrap_or(true);
        Self {
            status: if healthy { "ready" } else { "degraded" },
            checks: HealthChecks { database, redis },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
