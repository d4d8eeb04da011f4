//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use chrono::{DateTime, Utc};
use clan_core::{Application, GuildIdentityCandidate, PromotionQueueItem, RosterMember};

use super::responses::{
    ApplicationResponse, ApplicationSummary, PromotionItemResponse, RosterMemberResponse,
};

// ============================================================================
// Roster Mappers
// ============================================================================

/// A roster row paired with the instant its derived fields are computed for
pub struct RosterView<'a> {
    pub member: &'a RosterMember,
    pub now: DateTime<Utc>,
}

impl<'a> RosterView<'a> {
    pub fn new(member: &'a RosterMember, now: DateTime<Utc>) -> Self {
        Self { member, now }
    }
}

impl From<RosterView<'_>> for RosterMemberResponse {
    fn from(view: RosterView<'_>) -> Self {
        let m = view.member;
        let projection = m.projection(view.now);
        Self {
            id: m.id,
            discord_id: m.platform_id,
            discord_name: m.display_name.clone(),
            ign: m.in_game_name.clone(),
            uid: m.unique_game_id.clone(),
            status: m.status,
            has_420_tag: m.has_clan_tag,
            join_date: m.join_date,
            frozen_days: m.frozen_days,
            counting_since: m.counting_since,
            time_in_clan_days: projection.tenure_days,
            rank_current: m.current_rank,
            rank_next: projection.next_rank,
            promote_eligible: projection.promotion_eligible,
            promote_reason: projection.promotion_reason,
            needs_resolution: m.needs_resolution,
            resolution_status: m.resolution_status,
            resolved_at: m.resolved_at,
            resolved_by: m.resolved_by,
            source: m.source,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

// ============================================================================
// Application Mappers
// ============================================================================

impl From<&Application> for ApplicationResponse {
    fn from(app: &Application) -> Self {
        Self {
            id: app.id,
            discord_id: app.platform_id,
            display_name: app.display_name.clone(),
            answers: app.answers.clone(),
            status: app.status,
            log_thread_id: app.log_thread_id,
            reviewer_id: app.reviewer_id,
            reviewer_note: app.reviewer_note.clone(),
            accepted_at: app.accepted_at,
            accepted_by: app.accepted_by,
            denied_at: app.denied_at,
            denied_by: app.denied_by,
            deny_reason: app.deny_reason.clone(),
            created_at: app.created_at,
        }
    }
}

impl From<Application> for ApplicationResponse {
    fn from(app: Application) -> Self {
        Self::from(&app)
    }
}

impl From<&Application> for ApplicationSummary {
    fn from(app: &Application) -> Self {
        Self {
            id: app.id,
            status: app.status,
            created_at: app.created_at,
        }
    }
}

// ============================================================================
// Promotion Mappers
// ============================================================================

/// A queue item with the roster row it points at, if it still exists
pub struct QueueItemWithMember<'a> {
    pub item: &'a PromotionQueueItem,
    pub member: Option<&'a RosterMember>,
}

impl From<QueueItemWithMember<'_>> for PromotionItemResponse {
    fn from(value: QueueItemWithMember<'_>) -> Self {
        let item = value.item;
        Self {
            id: item.id,
            clan_member_id: item.member_id,
            discord_id: value.member.and_then(|m| m.platform_id),
            discord_name: value.member.map(|m| m.display_name.clone()),
            ign: value.member.map(|m| m.in_game_name.clone()),
            from_rank: item.from_rank,
            to_rank: item.to_rank,
            tenure_days: item.tenure_days,
            status: item.status,
            last_error: item.last_error.clone(),
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

// ============================================================================
// Directory Mappers
// ============================================================================

/// `@username (nick: X)` line shown under a search candidate
pub fn candidate_sublabel(candidate: &GuildIdentityCandidate) -> String {
    match candidate.nick.as_deref() {
        Some(nick) => format!("@{} (nick: {nick})", candidate.username),
        None => format!("@{}", candidate.username),
    }
}
