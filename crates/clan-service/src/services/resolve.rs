//! Identity resolution for roster rows
//!
//! Bulk resolution only ever picks an unambiguous match. Anything else is
//! left for staff to settle by hand through a signed candidate token.

use clan_core::matching::resolve_single;
use clan_core::{AuditAction, AuditEntry, DomainError, ResolutionStatus, RosterMember, Snowflake};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::dto::{
    BulkResolveResponse, ResolveDetail, ResolveMemberRequest, RosterMemberEnvelope, RosterView,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct ResolveService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ResolveService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Try to attach a platform identity to every unresolved row.
    ///
    /// A partially fetched directory is still used; the walk error is
    /// reported alongside the results. An empty, failed walk is an error.
    #[instrument(skip(self))]
    pub async fn bulk_resolve(&self, actor_id: Snowflake) -> ServiceResult<BulkResolveResponse> {
        let pending = self.ctx.roster_repo().list_unresolved().await?;
        if pending.is_empty() {
            return Ok(BulkResolveResponse {
                ok: true,
                ..BulkResolveResponse::default()
            });
        }

        let snapshot = self.ctx.directory().list_all_members().await;
        if snapshot.members.is_empty() {
            if let Some(error) = snapshot.error {
                return Err(DomainError::ExternalService(error).into());
            }
        }
        if let Some(error) = &snapshot.error {
            warn!(%error, fetched = snapshot.members.len(), "Resolving against a partial directory");
        }

        let now = self.ctx.now();
        let mut response = BulkResolveResponse {
            ok: true,
            total_checked: pending.len(),
            directory_error: snapshot.error.clone(),
            ..BulkResolveResponse::default()
        };

        for member in &pending {
            let result = if member.platform_id.is_some() {
                response.skipped += 1;
                "already_has_id".to_string()
            } else {
                let resolution = resolve_single(&member.display_name, &snapshot.members);
                match resolution.id {
                    Some(platform_id) => match self
                        .ctx
                        .roster_repo()
                        .set_resolution(member.id, platform_id, ResolutionStatus::ResolvedAuto, None, now)
                        .await
                    {
                        Ok(()) => {
                            response.resolved += 1;
                            "resolved".to_string()
                        }
                        Err(e) => {
                            response.db_errors += 1;
                            format!("db_error: {e}")
                        }
                    },
                    None if resolution.is_ambiguous() => {
                        response.ambiguous += 1;
                        format!("ambiguous ({} matches)", resolution.candidates)
                    }
                    None => {
                        response.not_found += 1;
                        "not_found".to_string()
                    }
                }
            };

            response.details.push(ResolveDetail {
                discord_name: member.display_name.clone(),
                result,
            });
        }

        info!(
            checked = response.total_checked,
            resolved = response.resolved,
            ambiguous = response.ambiguous,
            not_found = response.not_found,
            "Bulk resolve finished"
        );

        self.ctx
            .audit(
                AuditEntry::new(actor_id, AuditAction::ClanListBulkResolved).details(json!({
                    "total_checked": response.total_checked,
                    "resolved": response.resolved,
                    "skipped": response.skipped,
                    "ambiguous": response.ambiguous,
                    "not_found": response.not_found,
                    "db_errors": response.db_errors,
                })),
            )
            .await;

        Ok(response)
    }

    /// Staff picks an identity for one row.
    ///
    /// The identity comes from a resolve token issued by the search
    /// endpoint, or a raw id as a fallback. It must be in the guild.
    #[instrument(skip(self, request))]
    pub async fn resolve_manual(
        &self,
        actor_id: Snowflake,
        member_id: Snowflake,
        request: ResolveMemberRequest,
    ) -> ServiceResult<RosterMemberEnvelope> {
        let platform_id = self.selected_identity(&request)?;

        if self.ctx.directory().get_member(platform_id).await?.is_none() {
            return Err(ServiceError::NotInGuild(platform_id.to_string()));
        }

        let mut member: RosterMember = self
            .ctx
            .roster_repo()
            .find_by_id(member_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Roster member", member_id.to_string()))?;
        let old_platform_id = member.platform_id;

        let now = self.ctx.now();
        self.ctx
            .roster_repo()
            .set_resolution(member.id, platform_id, ResolutionStatus::ResolvedManual, Some(actor_id), now)
            .await?;
        member.mark_resolved(platform_id, ResolutionStatus::ResolvedManual, Some(actor_id), now);

        info!(%member_id, %platform_id, "Roster member resolved by hand");

        self.ctx
            .audit(
                AuditEntry::new(actor_id, AuditAction::ClanMemberResolved)
                    .target(member.id)
                    .details(json!({
                        "old_discord_id": old_platform_id,
                        "new_discord_id": platform_id,
                        "resolution_status": ResolutionStatus::ResolvedManual.as_str(),
                    })),
            )
            .await;

        Ok(RosterMemberEnvelope::new(RosterView::new(&member, now).into()))
    }

    fn selected_identity(&self, request: &ResolveMemberRequest) -> ServiceResult<Snowflake> {
        if let Some(token) = request.resolve_token.as_deref().filter(|t| !t.is_empty()) {
            return self
                .ctx
                .jwt_service()
                .validate_resolve_token(token)
                .map_err(|_| ServiceError::validation("resolve_token is invalid or expired"));
        }
        request
            .discord_id
            .ok_or_else(|| ServiceError::validation("resolve_token or discord_id is required"))
    }
}
