//! Promotion queue: build -> confirm -> process
//!
//! Every status change goes through the store's conditional transition, so
//! a concurrent caller that lost the race simply skips the item.

use std::collections::{BTreeMap, HashMap};

use clan_core::{
    AuditAction, AuditEntry, DomainError, PromotionQueueItem, QueueStatus, Rank, RosterMember,
    Snowflake,
};
use serde_json::json;
use tracing::{error, info, instrument, warn};

use crate::dto::{
    BuildQueueResponse, ClearQueueRequest, ClearQueueResponse, ConfirmQueueResponse,
    ProcessQueueResponse, PromotionItemResponse, PromotionQueueResponse, QueueItemEnvelope,
    QueueItemWithMember,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct PromotionService<'a> {
    ctx: &'a ServiceContext,
}

/// One promotion applied during a process pass
struct Promoted {
    platform_id: Snowflake,
    to_rank: Rank,
}

/// What happened to one confirmed item
enum Applied {
    Promoted(Promoted),
    /// The member reached `to_rank` or higher since the item was queued
    AlreadyAtRank,
    /// Another caller moved the item first
    Lost,
}

impl<'a> PromotionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Every queue item with its member's display data and the confirm gate
    #[instrument(skip(self))]
    pub async fn list(&self) -> ServiceResult<PromotionQueueResponse> {
        let items = self.ctx.promotion_repo().list(None).await?;
        let members = self.members_by_id().await?;

        let mut counts: BTreeMap<&'static str, i64> =
            QueueStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
        for (status, count) in self.ctx.promotion_repo().count_by_status().await? {
            counts.insert(status.as_str(), count);
        }

        let (confirmable, unresolved) = items
            .iter()
            .filter(|item| item.status == QueueStatus::Queued)
            .fold((0, 0), |(ok, missing), item| {
                if has_identity(members.get(&item.member_id)) {
                    (ok + 1, missing)
                } else {
                    (ok, missing + 1)
                }
            });

        let threshold = self.ctx.settings().roster.promotion_confirm_min;
        let items = items
            .iter()
            .map(|item| {
                PromotionItemResponse::from(QueueItemWithMember {
                    item,
                    member: members.get(&item.member_id),
                })
            })
            .collect();

        Ok(PromotionQueueResponse {
            items,
            counts,
            confirm_threshold: threshold,
            confirmable_count: confirmable,
            remaining_to_threshold: threshold.saturating_sub(confirmable),
            unresolved_count: unresolved,
        })
    }

    /// Queue every counting member whose earned rank is above their current
    /// rank. Members with an open item are skipped by the store.
    #[instrument(skip(self))]
    pub async fn build(&self, actor_id: Snowflake) -> ServiceResult<BuildQueueResponse> {
        let now = self.ctx.now();
        let counting = self.ctx.roster_repo().list_counting().await?;

        let mut added = 0;
        for member in &counting {
            let projection = member.projection(now);
            if !projection.promotion_eligible {
                continue;
            }
            let item = PromotionQueueItem::new(
                self.ctx.generate_id(),
                member.id,
                member.current_rank,
                projection.earned_rank,
                projection.tenure_days,
                now,
            );
            if self.ctx.promotion_repo().insert_if_absent(&item).await? {
                added += 1;
            }
        }

        let total_queued = self.count_of(QueueStatus::Queued).await?;
        info!(added, total_queued, scanned = counting.len(), "Promotion queue built");

        self.ctx
            .audit(
                AuditEntry::new(actor_id, AuditAction::PromotionQueueBuilt).details(json!({
                    "queued_added_count": added,
                    "total_queued_count": total_queued,
                })),
            )
            .await;

        Ok(BuildQueueResponse {
            ok: true,
            queued_added_count: added,
            total_queued_count: total_queued,
        })
    }

    /// Confirm every queued item whose member has a platform identity.
    ///
    /// Refused outright when fewer than the configured minimum are ready.
    #[instrument(skip(self))]
    pub async fn confirm(&self, actor_id: Snowflake) -> ServiceResult<ConfirmQueueResponse> {
        let queued = self.ctx.promotion_repo().list(Some(QueueStatus::Queued)).await?;
        let members = self.members_by_id().await?;

        let (ready, unresolved): (Vec<_>, Vec<_>) = queued
            .iter()
            .partition(|item| has_identity(members.get(&item.member_id)));

        let required = self.ctx.settings().roster.promotion_confirm_min;
        if ready.len() < required {
            return Err(DomainError::BelowConfirmThreshold {
                required,
                eligible: ready.len(),
            }
            .into());
        }

        let now = self.ctx.now();
        let mut confirmed = 0;
        for item in ready {
            if self
                .ctx
                .promotion_repo()
                .transition(item.id, QueueStatus::Queued, QueueStatus::Confirmed, None, now)
                .await?
            {
                confirmed += 1;
            }
        }

        info!(confirmed, unresolved = unresolved.len(), "Promotion queue confirmed");

        self.ctx
            .audit(
                AuditEntry::new(actor_id, AuditAction::PromotionQueueConfirmed).details(json!({
                    "confirmed_count": confirmed,
                    "unresolved_skipped": unresolved.len(),
                })),
            )
            .await;

        Ok(ConfirmQueueResponse {
            ok: true,
            confirmed_count: confirmed,
            unresolved_skipped: unresolved.len(),
        })
    }

    /// Apply roles for every confirmed item, then post one announcement.
    ///
    /// A role failure marks that item failed and the pass continues. Removing
    /// the previous rank role is best effort. Items whose member already holds
    /// the target rank are closed without touching roles or the announcement.
    #[instrument(skip(self))]
    pub async fn process(&self, actor_id: Snowflake) -> ServiceResult<ProcessQueueResponse> {
        let confirmed = self
            .ctx
            .promotion_repo()
            .list(Some(QueueStatus::Confirmed))
            .await?;

        let mut promoted = Vec::new();
        let mut failed = 0;
        let mut skipped = 0;

        for item in &confirmed {
            match self.apply(item).await {
                Ok(Applied::Promoted(done)) => promoted.push(done),
                Ok(Applied::AlreadyAtRank) => skipped += 1,
                Ok(Applied::Lost) => {}
                Err(reason) => {
                    warn!(item_id = %item.id, %reason, "Promotion failed");
                    failed += 1;
                    if let Err(e) = self
                        .ctx
                        .promotion_repo()
                        .transition(
                            item.id,
                            QueueStatus::Confirmed,
                            QueueStatus::Failed,
                            Some(&reason),
                            self.ctx.now(),
                        )
                        .await
                    {
                        error!(item_id = %item.id, error = %e, "Could not mark promotion failed");
                    }
                }
            }
        }

        let announcement_posted = self.announce(&promoted).await;
        info!(
            processed = promoted.len(),
            failed,
            skipped,
            announcement_posted,
            "Promotion queue processed"
        );

        self.ctx
            .audit(
                AuditEntry::new(actor_id, AuditAction::PromotionQueueProcessed).details(json!({
                    "processed_count": promoted.len(),
                    "failed_count": failed,
                    "skipped_count": skipped,
                    "announcement_posted": announcement_posted,
                })),
            )
            .await;

        Ok(ProcessQueueResponse {
            ok: true,
            processed_count: promoted.len(),
            failed_count: failed,
            skipped_count: skipped,
            announcement_posted,
        })
    }

    /// Remove every open item that has not been processed
    #[instrument(skip(self, request))]
    pub async fn clear(
        &self,
        actor_id: Snowflake,
        request: ClearQueueRequest,
    ) -> ServiceResult<ClearQueueResponse> {
        if !request.confirm {
            return Err(DomainError::ConfirmationRequired.into());
        }

        let cleared = self.ctx.promotion_repo().clear_open(self.ctx.now()).await?;
        info!(cleared, "Promotion queue cleared");

        self.ctx
            .audit(
                AuditEntry::new(actor_id, AuditAction::PromotionQueueCleared)
                    .details(json!({ "cleared_count": cleared })),
            )
            .await;

        Ok(ClearQueueResponse {
            ok: true,
            cleared_count: cleared,
        })
    }

    /// queued -> removed for one item
    #[instrument(skip(self))]
    pub async fn remove(&self, actor_id: Snowflake, id: Snowflake) -> ServiceResult<QueueItemEnvelope> {
        let item = self
            .move_item(id, QueueStatus::Queued, QueueStatus::Removed)
            .await?;

        self.ctx
            .audit(
                AuditEntry::new(actor_id, AuditAction::PromotionItemRemoved)
                    .target(id)
                    .details(json!({ "clan_member_id": item.clan_member_id })),
            )
            .await;

        Ok(QueueItemEnvelope { ok: true, item })
    }

    /// failed -> confirmed for one item, so the next process pass retries it
    #[instrument(skip(self))]
    pub async fn retry(&self, actor_id: Snowflake, id: Snowflake) -> ServiceResult<QueueItemEnvelope> {
        let item = self
            .move_item(id, QueueStatus::Failed, QueueStatus::Confirmed)
            .await?;

        self.ctx
            .audit(
                AuditEntry::new(actor_id, AuditAction::PromotionItemReset)
                    .target(id)
                    .details(json!({ "clan_member_id": item.clan_member_id })),
            )
            .await;

        Ok(QueueItemEnvelope { ok: true, item })
    }

    /// Promote one confirmed item.
    ///
    /// The member row is read fresh, so a rank raised by hand after the item
    /// was queued is never lowered. `Err` carries the reason stored on the
    /// failed item.
    async fn apply(&self, item: &PromotionQueueItem) -> Result<Applied, String> {
        let repo = self.ctx.roster_repo();
        let mut member = repo
            .find_by_id(item.member_id)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| "Roster member no longer exists".to_string())?;

        if item.to_rank <= member.current_rank {
            let note = format!("Skipped: member already at {}", member.current_rank.as_str());
            info!(
                item_id = %item.id,
                current = member.current_rank.as_str(),
                "Promotion already applied"
            );
            let moved = self
                .ctx
                .promotion_repo()
                .transition(
                    item.id,
                    QueueStatus::Confirmed,
                    QueueStatus::Processed,
                    Some(&note),
                    self.ctx.now(),
                )
                .await
                .map_err(|e| e.to_string())?;
            return Ok(if moved { Applied::AlreadyAtRank } else { Applied::Lost });
        }
        let platform_id = member
            .platform_id
            .ok_or_else(|| "Roster member has no Discord ID".to_string())?;

        let ladder = &self.ctx.settings().ladder;
        if let Some(role_id) = ladder.role_for(item.to_rank) {
            self.ctx
                .directory()
                .assign_role(platform_id, role_id)
                .await
                .map_err(|e| format!("Role assignment failed: {e}"))?;
        }
        if let Some(old_role) = ladder.role_for(item.from_rank) {
            if let Err(e) = self.ctx.directory().remove_role(platform_id, old_role).await {
                warn!(%platform_id, error = %e, "Could not remove previous rank role");
            }
        }

        let now = self.ctx.now();
        member.promote_to(item.to_rank, now);
        repo.update(&member)
            .await
            .map_err(|e| format!("Roster update failed: {e}"))?;

        let moved = self
            .ctx
            .promotion_repo()
            .transition(item.id, QueueStatus::Confirmed, QueueStatus::Processed, None, now)
            .await
            .map_err(|e| e.to_string())?;

        Ok(if moved {
            Applied::Promoted(Promoted {
                platform_id,
                to_rank: item.to_rank,
            })
        } else {
            Applied::Lost
        })
    }

    /// Post the batch summary. Nothing is posted for an empty batch.
    async fn announce(&self, promoted: &[Promoted]) -> bool {
        if promoted.is_empty() {
            return false;
        }

        let mut message = String::from("**Promotions**");
        for p in promoted {
            message.push_str(&format!("\n<@{}> promoted to **{}**", p.platform_id, p.to_rank.as_str()));
        }

        match self
            .ctx
            .messaging()
            .post_message(self.ctx.settings().promotion_channel_id, &message)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Promotion announcement failed");
                false
            }
        }
    }

    async fn move_item(
        &self,
        id: Snowflake,
        from: QueueStatus,
        to: QueueStatus,
    ) -> ServiceResult<PromotionItemResponse> {
        let repo = self.ctx.promotion_repo();
        let mut item = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Promotion queue item", id.to_string()))?;

        if item.status != from {
            return Err(DomainError::InvalidTransition {
                from: item.status.as_str(),
                to: to.as_str(),
            }
            .into());
        }

        let now = self.ctx.now();
        if !repo.transition(id, from, to, None, now).await? {
            return Err(ServiceError::conflict("Queue item changed while updating"));
        }
        item.advance(to, None, now)?;

        let member = self.ctx.roster_repo().find_by_id(item.member_id).await?;
        Ok(PromotionItemResponse::from(QueueItemWithMember {
            item: &item,
            member: member.as_ref(),
        }))
    }

    async fn members_by_id(&self) -> ServiceResult<HashMap<Snowflake, RosterMember>> {
        Ok(self
            .ctx
            .roster_repo()
            .list_all()
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect())
    }

    async fn count_of(&self, status: QueueStatus) -> ServiceResult<i64> {
        Ok(self
            .ctx
            .promotion_repo()
            .count_by_status()
            .await?
            .into_iter()
            .find_map(|(s, n)| (s == status).then_some(n))
            .unwrap_or(0))
    }
}

fn has_identity(member: Option<&RosterMember>) -> bool {
    member.is_some_and(|m| m.platform_id.is_some())
}
