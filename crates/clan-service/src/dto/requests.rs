//! Request DTOs for API endpoints
//!
//! Body DTOs implement `Deserialize` and `Validate`; query DTOs only
//! `Deserialize`.

use clan_core::{ApplicationStatus, MemberStatus, Snowflake};
use serde::{Deserialize, Deserializer};
use validator::Validate;

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Application Requests
// ============================================================================

/// Applicant form submission
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SubmitApplicationRequest {
    #[serde(alias = "in_game_name")]
    #[validate(length(min = 1, max = 64, message = "In-game name must be 1-64 characters"))]
    pub ign: String,

    #[serde(default, alias = "unique_game_id")]
    #[validate(length(max = 64, message = "UID must be at most 64 characters"))]
    pub uid: Option<String>,

    #[validate(length(max = 16))]
    pub age: Option<String>,

    #[validate(length(max = 64))]
    pub timezone: Option<String>,

    #[validate(length(max = 1000, message = "Playstyle must be at most 1000 characters"))]
    pub playstyle: Option<String>,

    #[validate(length(max = 2000, message = "Answer must be at most 2000 characters"))]
    pub why_join: Option<String>,

    #[validate(length(max = 200))]
    pub referral: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationListQuery {
    pub status: Option<ApplicationStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Accept,
    Reject,
    RetryCreateClanMember,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReviewApplicationRequest {
    pub action: ReviewAction,

    #[validate(length(max = 1000, message = "Note must be at most 1000 characters"))]
    pub note: Option<String>,

    #[serde(default, alias = "reason")]
    #[validate(length(max = 1000, message = "Reason must be at most 1000 characters"))]
    pub deny_reason: Option<String>,
}

// ============================================================================
// Roster Requests
// ============================================================================

/// Roster list filters. Unknown status values are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterListQuery {
    pub page: Option<usize>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub has_420_tag: Option<bool>,
    pub promotion_due: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateRosterMemberRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "discord_name is required"))]
    pub discord_name: String,

    pub discord_id: Option<Snowflake>,

    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "ign is required"))]
    pub ign: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "uid is required"))]
    pub uid: String,

    /// `YYYY-MM-DD`
    #[serde(default)]
    #[validate(length(min = 1, message = "join_date is required"))]
    pub join_date: String,

    pub status: Option<MemberStatus>,
    pub has_420_tag: Option<bool>,
    pub rank_current: Option<String>,
    pub needs_resolution: Option<bool>,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRosterMemberRequest {
    #[validate(length(min = 1, max = 100))]
    pub discord_name: Option<String>,

    /// `null` clears the platform identity
    #[serde(default, deserialize_with = "explicit_null")]
    pub discord_id: Option<Option<Snowflake>>,

    #[validate(length(min = 1, max = 64))]
    pub ign: Option<String>,

    /// `null` clears the game id
    #[serde(default, deserialize_with = "explicit_null")]
    pub uid: Option<Option<String>>,

    pub join_date: Option<String>,
    pub status: Option<MemberStatus>,
    pub has_420_tag: Option<bool>,
    pub rank_current: Option<String>,
    pub needs_resolution: Option<bool>,
}

/// Manual identity pick: a resolve token from member search, or a raw id
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolveMemberRequest {
    pub resolve_token: Option<String>,
    #[serde(alias = "selected_discord_id")]
    pub discord_id: Option<Snowflake>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuildMemberSearchQuery {
    #[serde(default, alias = "query")]
    pub q: String,
    pub limit: Option<usize>,
}

/// Import body: pre-parsed rows, raw CSV text, or both
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
    pub csv: Option<String>,
}

// ============================================================================
// Promotion Requests
// ============================================================================

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ClearQueueRequest {
    #[serde(default)]
    pub confirm: bool,
}
