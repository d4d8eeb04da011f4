//! Bulk roster import
//!
//! Rows are processed independently: a bad or unsaveable row is recorded
//! and the batch continues. The directory is fetched once per batch.

use chrono::{DateTime, Utc};
use clan_core::ladder::kept_rank;
use clan_core::matching::{has_clan_tag, resolve_single};
use clan_core::{
    AuditAction, AuditEntry, DirectorySnapshot, DomainError, MemberSource, RosterMember,
    Snowflake,
};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::dto::{ImportRequest, ImportResponse};
use crate::import::{rows_from_csv, ImportRow, ValidRow};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct ImportService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ImportService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Import a batch of roster rows keyed on the unique game id.
    ///
    /// Oversized batches are rejected before the actor's cooldown starts.
    #[instrument(skip(self, request))]
    pub async fn import(
        &self,
        actor_id: Snowflake,
        request: ImportRequest,
    ) -> ServiceResult<ImportResponse> {
        let rows = collect_rows(&request)?;
        let limits = &self.ctx.settings().roster;

        if rows.is_empty() {
            return Err(ServiceError::validation("rows is required (non-empty array)"));
        }
        if rows.len() > limits.import_max_rows {
            return Err(DomainError::BatchTooLarge {
                max: limits.import_max_rows,
                got: rows.len(),
            }
            .into());
        }

        self.ctx
            .cooldowns()
            .acquire(&format!("import:{actor_id}"), limits.import_cooldown_secs)
            .await?;

        let snapshot = self.ctx.directory().list_all_members().await;
        if let Some(error) = &snapshot.error {
            warn!(%error, fetched = snapshot.members.len(), "Directory walk incomplete; unmatched rows stay unresolved");
        }

        let now = self.ctx.now();
        let mut response = ImportResponse {
            ok: true,
            ..ImportResponse::default()
        };

        for (index, raw) in rows.iter().enumerate() {
            let row_number = index + 1;
            let row = match raw.validate(row_number) {
                Ok(row) => row,
                Err(message) => {
                    response.errors.push(message);
                    continue;
                }
            };

            let member = self.build_member(row, &snapshot, now);
            if member.platform_id.is_none() {
                response.unresolved += 1;
            }

            match self.ctx.roster_repo().upsert_by_unique_game_id(&member).await {
                Ok(outcome) if outcome.inserted => response.imported += 1,
                Ok(_) => response.updated += 1,
                Err(e) => response
                    .errors
                    .push(format!("Row {row_number}: save failed - {e}")),
            }
        }

        info!(
            imported = response.imported,
            updated = response.updated,
            unresolved = response.unresolved,
            errors = response.errors.len(),
            "Roster import finished"
        );

        self.ctx
            .audit(
                AuditEntry::new(actor_id, AuditAction::ClanListImported).details(json!({
                    "imported": response.imported,
                    "updated": response.updated,
                    "unresolved": response.unresolved,
                    "error_count": response.errors.len(),
                })),
            )
            .await;

        Ok(response)
    }

    /// Roster row for one validated sheet row.
    ///
    /// The clan tag is only detected on a resolved identity. Counting
    /// members accrue from the join date; others carry the sheet's days.
    /// The stored rank is the higher of the declared and the earned rank.
    fn build_member(
        &self,
        row: ValidRow,
        snapshot: &DirectorySnapshot,
        now: DateTime<Utc>,
    ) -> RosterMember {
        let platform_id = resolve_single(&row.discord_name, &snapshot.members).id;
        let tagged = platform_id
            .and_then(|id| snapshot.get(id))
            .is_some_and(|m| has_clan_tag(m, &self.ctx.settings().roster.clan_tag));

        let mut member = RosterMember::new(
            self.ctx.generate_id(),
            row.discord_name,
            row.in_game_name,
            row.join_date,
            now,
        )
        .with_unique_game_id(row.uid)
        .with_source(MemberSource::Csv)
        .with_membership(row.status, tagged, row.carried_days)
        .with_platform_id(platform_id);

        let earned = member.projection(now).earned_rank;
        member.current_rank = kept_rank(Some(row.declared_rank), earned);
        member.refresh_derived(now);
        member
    }
}

/// JSON rows first, then any CSV text
fn collect_rows(request: &ImportRequest) -> ServiceResult<Vec<ImportRow>> {
    let mut rows: Vec<ImportRow> = request.rows.iter().map(ImportRow::from_json).collect();
    if let Some(text) = request.csv.as_deref().filter(|t| !t.trim().is_empty()) {
        let parsed =
            rows_from_csv(text).map_err(|e| ServiceError::validation(format!("Invalid CSV: {e}")))?;
        rows.extend(parsed);
    }
    Ok(rows)
}
