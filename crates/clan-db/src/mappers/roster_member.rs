//! Roster member entity <-> model mapper

use chrono::{DateTime, NaiveDate, Utc};
use clan_core::{MemberSource, MemberStatus, Rank, ResolutionStatus, RosterMember, Snowflake};

use crate::models::RosterMemberModel;

/// Convert RosterMemberModel to RosterMember entity
impl From<RosterMemberModel> for RosterMember {
    fn from(model: RosterMemberModel) -> Self {
        RosterMember {
            id: Snowflake::new(model.id),
            platform_id: model.discord_id.map(Snowflake::new),
            display_name: model.discord_name,
            in_game_name: model.ingame_name,
            unique_game_id: model.uid,
            status: MemberStatus::parse(&model.status).unwrap_or_default(),
            has_clan_tag: model.has_clan_tag,
            join_date: model.join_date,
            frozen_days: model.frozen_days,
            counting_since: model.counting_since,
            current_rank: Rank::from_name_or_entry(&model.rank_current),
            next_rank: model.rank_next.as_deref().and_then(Rank::from_name),
            promotion_eligible: model.promotion_eligible,
            promotion_reason: model.promotion_reason,
            needs_resolution: model.needs_resolution,
            resolution_status: ResolutionStatus::parse(&model.resolution_status)
                .unwrap_or_default(),
            resolved_at: model.resolved_at,
            resolved_by: model.resolved_by.map(Snowflake::new),
            source: MemberSource::parse(&model.source).unwrap_or_default(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// RosterMember flattened to column values, in `ROSTER_COLUMNS` order
pub struct RosterMemberRow<'a> {
    pub id: i64,
    pub discord_id: Option<i64>,
    pub discord_name: &'a str,
    pub ingame_name: &'a str,
    pub uid: Option<&'a str>,
    pub status: &'static str,
    pub has_clan_tag: bool,
    pub join_date: NaiveDate,
    pub frozen_days: i64,
    pub counting_since: Option<DateTime<Utc>>,
    pub rank_current: &'static str,
    pub rank_next: Option<&'static str>,
    pub promotion_eligible: bool,
    pub promotion_reason: Option<&'a str>,
    pub needs_resolution: bool,
    pub resolution_status: &'static str,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<i64>,
    pub source: &'static str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> RosterMemberRow<'a> {
    pub fn new(member: &'a RosterMember) -> Self {
        Self {
            id: member.id.into_inner(),
            discord_id: member.platform_id.map(Snowflake::into_inner),
            discord_name: &member.display_name,
            ingame_name: &member.in_game_name,
            uid: member.unique_game_id.as_deref(),
            status: member.status.as_str(),
            has_clan_tag: member.has_clan_tag,
            join_date: member.join_date,
            frozen_days: member.frozen_days,
            counting_since: member.counting_since,
            rank_current: member.current_rank.as_str(),
            rank_next: member.next_rank.map(Rank::as_str),
            promotion_eligible: member.promotion_eligible,
            promotion_reason: member.promotion_reason.as_deref(),
            needs_resolution: member.needs_resolution,
            resolution_status: member.resolution_status.as_str(),
            resolved_at: member.resolved_at,
            resolved_by: member.resolved_by.map(Snowflake::into_inner),
            source: member.source.as_str(),
            created_at: member.created_at,
            updated_at: member.updated_at,
        }
    }
}
