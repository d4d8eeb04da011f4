//! Roster member database model

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Database model for clan_members table
#[derive(Debug, Clone, FromRow)]
pub struct RosterMemberModel {
    pub id: i64,
    pub discord_id: Option<i64>,
    pub discord_name: String,
    pub ingame_name: String,
    pub uid: Option<String>,
    pub status: String,
    pub has_clan_tag: bool,
    pub join_date: NaiveDate,
    pub frozen_days: i64,
    pub counting_since: Option<DateTime<Utc>>,
    pub rank_current: String,
    pub rank_next: Option<String>,
    pub promotion_eligible: bool,
    pub promotion_reason: Option<String>,
    pub needs_resolution: bool,
    pub resolution_status: String,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<i64>,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row returned by an upsert: the member plus whether Postgres inserted it
#[derive(Debug, Clone, FromRow)]
pub struct UpsertedRosterMemberModel {
    #[sqlx(flatten)]
    pub member: RosterMemberModel,
    pub inserted: bool,
}
