//! Roster service
//!
//! Staff-facing listing and single-row edits. Derived rank fields are
//! recomputed on every read and every write.

use clan_core::{
    AuditAction, AuditEntry, MemberSource, MemberStatus, Rank, ResolutionStatus, RosterFilter,
    RosterMember, Snowflake,
};
use serde_json::json;
use tracing::{info, instrument};

use crate::dto::{
    CreateRosterMemberRequest, RosterListQuery, RosterMemberEnvelope, RosterMemberResponse,
    RosterPageResponse, RosterView, UpdateRosterMemberRequest,
};
use crate::import::parse_date;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct RosterService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RosterService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// One page of the filtered roster, ordered by join date
    #[instrument(skip(self, query))]
    pub async fn list(&self, query: RosterListQuery) -> ServiceResult<RosterPageResponse> {
        let now = self.ctx.now();
        let all = self.ctx.roster_repo().list_all().await?;

        let filter = RosterFilter {
            status: query.status.as_deref().and_then(MemberStatus::parse),
            has_clan_tag: query.has_420_tag,
            promotion_due: query.promotion_due,
            search: query.search,
        };

        let promotion_due_count = all
            .iter()
            .filter(|m| m.projection(now).promotion_eligible)
            .count();
        let unresolved_count = all.iter().filter(|m| m.needs_resolution).count();

        let matching: Vec<&RosterMember> = all.iter().filter(|m| filter.matches(m, now)).collect();
        let page_size = self.ctx.settings().roster.page_size.max(1);
        let page = query.page.unwrap_or(1).max(1);
        let total = matching.len();

        let members = matching
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .map(|m| RosterMemberResponse::from(RosterView::new(m, now)))
            .collect();

        Ok(RosterPageResponse {
            members,
            total,
            page,
            page_size,
            total_pages: total.div_ceil(page_size),
            promotion_due_count,
            unresolved_count,
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Snowflake) -> ServiceResult<RosterMemberResponse> {
        let member = self.find(id).await?;
        Ok(RosterView::new(&member, self.ctx.now()).into())
    }

    /// Add a member by hand. A supplied platform id counts as a manual
    /// resolution by the actor.
    #[instrument(skip(self, request), fields(uid = %request.uid))]
    pub async fn create(
        &self,
        actor_id: Snowflake,
        request: CreateRosterMemberRequest,
    ) -> ServiceResult<RosterMemberEnvelope> {
        let discord_name = request.discord_name.trim();
        let ign = request.ign.trim();
        let uid = request.uid.trim();
        if discord_name.is_empty() || ign.is_empty() || uid.is_empty() || request.join_date.trim().is_empty() {
            return Err(ServiceError::validation(
                "discord_name, ign, uid, and join_date are required",
            ));
        }
        let join_date = parse_date(&request.join_date)
            .ok_or_else(|| ServiceError::validation("join_date is not a valid date"))?;

        let now = self.ctx.now();
        let rank = request
            .rank_current
            .as_deref()
            .map_or(Rank::ENTRY, Rank::from_name_or_entry);

        let mut member = RosterMember::new(
            self.ctx.generate_id(),
            discord_name.to_string(),
            ign.to_string(),
            join_date,
            now,
        )
        .with_unique_game_id(uid)
        .with_rank(rank)
        .with_source(MemberSource::Manual)
        .with_membership(
            request.status.unwrap_or_default(),
            request.has_420_tag.unwrap_or(false),
            0,
        );

        if let Some(platform_id) = request.discord_id {
            member.mark_resolved(platform_id, ResolutionStatus::ResolvedManual, Some(actor_id), now);
        }
        if let Some(flag) = request.needs_resolution {
            member.needs_resolution = flag;
        }
        member.refresh_derived(now);

        self.ctx.roster_repo().create(&member).await?;
        info!(member_id = %member.id, "Roster member added");

        self.ctx
            .audit(
                AuditEntry::new(actor_id, AuditAction::ClanMemberAdded)
                    .target(member.id)
                    .details(json!({
                        "discord_name": member.display_name,
                        "ign": member.in_game_name,
                        "uid": member.unique_game_id,
                    })),
            )
            .await;

        Ok(RosterMemberEnvelope::new(RosterView::new(&member, now).into()))
    }

    /// Partial update. A status or tag change freezes or unfreezes tenure
    /// before the derived fields are recomputed.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        actor_id: Snowflake,
        id: Snowflake,
        request: UpdateRosterMemberRequest,
    ) -> ServiceResult<RosterMemberEnvelope> {
        let mut member = self.find(id).await?;
        let now = self.ctx.now();
        let mut changed: Vec<&str> = Vec::new();

        if let Some(name) = request.discord_name {
            member.display_name = name.trim().to_string();
            changed.push("discord_name");
        }
        if let Some(ign) = request.ign {
            member.in_game_name = ign.trim().to_string();
            changed.push("ign");
        }
        if let Some(uid) = request.uid {
            member.unique_game_id = uid.map(|u| u.trim().to_string()).filter(|u| !u.is_empty());
            changed.push("uid");
        }
        if let Some(raw) = request.join_date {
            member.join_date = parse_date(&raw)
                .ok_or_else(|| ServiceError::validation("join_date is not a valid date"))?;
            changed.push("join_date");
        }
        match request.discord_id {
            Some(Some(platform_id)) if member.platform_id != Some(platform_id) => {
                member.mark_resolved(platform_id, ResolutionStatus::ResolvedManual, Some(actor_id), now);
                changed.push("discord_id");
            }
            Some(None) if member.platform_id.is_some() => {
                member.clear_resolution(now);
                changed.push("discord_id");
            }
            _ => {}
        }
        if let Some(flag) = request.needs_resolution {
            member.needs_resolution = flag;
            changed.push("needs_resolution");
        }
        if let Some(raw) = request.rank_current {
            member.current_rank = Rank::from_name_or_entry(&raw);
            changed.push("rank_current");
        }

        let status = request.status.unwrap_or(member.status);
        let has_tag = request.has_420_tag.unwrap_or(member.has_clan_tag);
        if status != member.status {
            changed.push("status");
        }
        if has_tag != member.has_clan_tag {
            changed.push("has_420_tag");
        }
        // Refreshes the derived fields even when membership is unchanged
        member.set_membership(status, has_tag, now);

        self.ctx.roster_repo().update(&member).await?;
        info!(member_id = %member.id, ?changed, "Roster member updated");

        self.ctx
            .audit(
                AuditEntry::new(actor_id, AuditAction::ClanMemberUpdated)
                    .target(member.id)
                    .details(json!({ "fields": changed })),
            )
            .await;

        Ok(RosterMemberEnvelope::new(RosterView::new(&member, now).into()))
    }

    async fn find(&self, id: Snowflake) -> ServiceResult<RosterMember> {
        self.ctx
            .roster_repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Roster member", id.to_string()))
    }
}
