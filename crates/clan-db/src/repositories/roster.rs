//! PostgreSQL implementation of RosterRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use tracing::{instrument, warn};

use clan_core::{
    AcceptedApplicant, DomainError, RepoResult, ResolutionStatus, RosterMember, RosterRepository,
    Snowflake, UpsertOutcome,
};

use crate::mappers::RosterMemberRow;
use crate::models::{RosterMemberModel, UpsertedRosterMemberModel};

use super::error::{map_db_error, map_member_conflict, map_unique_violation, roster_member_not_found};

const ROSTER_COLUMNS: &str = "id, discord_id, discord_name, ingame_name, uid, status, \
    has_clan_tag, join_date, frozen_days, counting_since, rank_current, rank_next, \
    promotion_eligible, promotion_reason, needs_resolution, resolution_status, resolved_at, \
    resolved_by, source, created_at, updated_at";

const ROSTER_VALUES: &str = "$1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, \
    $15, $16, $17, $18, $19, $20, $21";

/// Bind every column of a [`RosterMemberRow`] in `ROSTER_COLUMNS` order
macro_rules! bind_member_row {
    ($query:expr, $row:expr) => {
        $query
            .bind($row.id)
            .bind($row.discord_id)
            .bind($row.discord_name)
            .bind($row.ingame_name)
            .bind($row.uid)
            .bind($row.status)
            .bind($row.has_clan_tag)
            .bind($row.join_date)
            .bind($row.frozen_days)
            .bind($row.counting_since)
            .bind($row.rank_current)
            .bind($row.rank_next)
            .bind($row.promotion_eligible)
            .bind($row.promotion_reason)
            .bind($row.needs_resolution)
            .bind($row.resolution_status)
            .bind($row.resolved_at)
            .bind($row.resolved_by)
            .bind($row.source)
            .bind($row.created_at)
            .bind($row.updated_at)
    };
}

/// Attempts at merging an applicant before giving up on a racing writer
const APPLICANT_UPSERT_ATTEMPTS: usize = 2;

/// PostgreSQL implementation of RosterRepository
#[derive(Clone)]
pub struct PgRosterRepository {
    pool: PgPool,
}

impl PgRosterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_where(&self, predicate: &str) -> RepoResult<Vec<RosterMember>> {
        let sql = format!(
            "SELECT {ROSTER_COLUMNS} FROM clan_members {predicate} ORDER BY join_date ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, RosterMemberModel>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(RosterMember::from).collect())
    }
}

/// Overwrite every mutable column of an existing row
async fn write_member<'c, E>(executor: E, member: &RosterMember) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'c>,
{
    let row = RosterMemberRow::new(member);
    let result = sqlx::query(
        r"
        UPDATE clan_members
        SET discord_id = $2, discord_name = $3, ingame_name = $4, uid = $5, status = $6,
            has_clan_tag = $7, join_date = $8, frozen_days = $9, counting_since = $10,
            rank_current = $11, rank_next = $12, promotion_eligible = $13,
            promotion_reason = $14, needs_resolution = $15, resolution_status = $16,
            resolved_at = $17, resolved_by = $18, source = $19, updated_at = $20
        WHERE id = $1
        ",
    )
    .bind(row.id)
    .bind(row.discord_id)
    .bind(row.discord_name)
    .bind(row.ingame_name)
    .bind(row.uid)
    .bind(row.status)
    .bind(row.has_clan_tag)
    .bind(row.join_date)
    .bind(row.frozen_days)
    .bind(row.counting_since)
    .bind(row.rank_current)
    .bind(row.rank_next)
    .bind(row.promotion_eligible)
    .bind(row.promotion_reason)
    .bind(row.needs_resolution)
    .bind(row.resolution_status)
    .bind(row.resolved_at)
    .bind(row.resolved_by)
    .bind(row.source)
    .bind(row.updated_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

#[async_trait]
impl RosterRepository for PgRosterRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<RosterMember>> {
        let sql = format!("SELECT {ROSTER_COLUMNS} FROM clan_members WHERE id = $1");
        let result = sqlx::query_as::<_, RosterMemberModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(RosterMember::from))
    }

    #[instrument(skip(self))]
    async fn find_by_platform_id(&self, platform_id: Snowflake) -> RepoResult<Option<RosterMember>> {
        let sql = format!("SELECT {ROSTER_COLUMNS} FROM clan_members WHERE discord_id = $1");
        let result = sqlx::query_as::<_, RosterMemberModel>(&sql)
            .bind(platform_id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(RosterMember::from))
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> RepoResult<Vec<RosterMember>> {
        self.fetch_where("").await
    }

    #[instrument(skip(self))]
    async fn list_unresolved(&self) -> RepoResult<Vec<RosterMember>> {
        self.fetch_where("WHERE discord_id IS NULL OR needs_resolution")
            .await
    }

    #[instrument(skip(self))]
    async fn list_counting(&self) -> RepoResult<Vec<RosterMember>> {
        self.fetch_where("WHERE status = 'active' AND has_clan_tag")
            .await
    }

    #[instrument(skip(self, member), fields(member_id = %member.id))]
    async fn create(&self, member: &RosterMember) -> RepoResult<()> {
        let row = RosterMemberRow::new(member);
        let sql = format!("INSERT INTO clan_members ({ROSTER_COLUMNS}) VALUES ({ROSTER_VALUES})");
        bind_member_row!(sqlx::query(&sql), row)
            .execute(&self.pool)
            .await
            .map_err(|e| map_member_conflict(e, member))?;

        Ok(())
    }

    #[instrument(skip(self, member), fields(member_id = %member.id))]
    async fn update(&self, member: &RosterMember) -> RepoResult<()> {
        let affected = write_member(&self.pool, member)
            .await
            .map_err(|e| map_member_conflict(e, member))?;

        if affected == 0 {
            return Err(roster_member_not_found(member.id));
        }

        Ok(())
    }

    #[instrument(skip(self, member), fields(uid = ?member.unique_game_id))]
    async fn upsert_by_unique_game_id(&self, member: &RosterMember) -> RepoResult<UpsertOutcome> {
        if member.unique_game_id.is_none() {
            return Err(DomainError::ValidationError(
                "upsert requires a unique game id".to_string(),
            ));
        }

        // Identity columns only move when the incoming row carries an identity.
        let sql = format!(
            r"
            INSERT INTO clan_members ({ROSTER_COLUMNS})
            VALUES ({ROSTER_VALUES})
            ON CONFLICT (uid) DO UPDATE SET
                discord_id = COALESCE(EXCLUDED.discord_id, clan_members.discord_id),
                discord_name = EXCLUDED.discord_name,
                ingame_name = EXCLUDED.ingame_name,
                status = EXCLUDED.status,
                has_clan_tag = EXCLUDED.has_clan_tag,
                join_date = EXCLUDED.join_date,
                frozen_days = EXCLUDED.frozen_days,
                counting_since = EXCLUDED.counting_since,
                rank_current = EXCLUDED.rank_current,
                rank_next = EXCLUDED.rank_next,
                promotion_eligible = EXCLUDED.promotion_eligible,
                promotion_reason = EXCLUDED.promotion_reason,
                needs_resolution = CASE WHEN EXCLUDED.discord_id IS NULL
                    THEN clan_members.needs_resolution ELSE EXCLUDED.needs_resolution END,
                resolution_status = CASE WHEN EXCLUDED.discord_id IS NULL
                    THEN clan_members.resolution_status ELSE EXCLUDED.resolution_status END,
                resolved_at = CASE WHEN EXCLUDED.discord_id IS NULL
                    THEN clan_members.resolved_at ELSE EXCLUDED.resolved_at END,
                resolved_by = CASE WHEN EXCLUDED.discord_id IS NULL
                    THEN clan_members.resolved_by ELSE EXCLUDED.resolved_by END,
                source = EXCLUDED.source,
                updated_at = EXCLUDED.updated_at
            RETURNING {ROSTER_COLUMNS}, (xmax = 0) AS inserted
            "
        );

        let row = RosterMemberRow::new(member);
        let upserted = bind_member_row!(sqlx::query_as::<_, UpsertedRosterMemberModel>(&sql), row)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_member_conflict(e, member))?;

        Ok(UpsertOutcome {
            member: RosterMember::from(upserted.member),
            inserted: upserted.inserted,
        })
    }

    #[instrument(skip(self, applicant), fields(platform_id = %applicant.platform_id))]
    async fn upsert_from_applicant(
        &self,
        applicant: &AcceptedApplicant,
        new_id: Snowflake,
        now: DateTime<Utc>,
    ) -> RepoResult<RosterMember> {
        let by_platform = format!(
            "SELECT {ROSTER_COLUMNS} FROM clan_members WHERE discord_id = $1 FOR UPDATE"
        );
        let by_uid = format!(
            "SELECT {ROSTER_COLUMNS} FROM clan_members \
             WHERE uid = $1 AND discord_id IS NULL FOR UPDATE"
        );
        let insert = format!(
            "INSERT INTO clan_members ({ROSTER_COLUMNS}) VALUES ({ROSTER_VALUES}) \
             ON CONFLICT DO NOTHING"
        );

        for attempt in 1..=APPLICANT_UPSERT_ATTEMPTS {
            let mut tx = self.pool.begin().await.map_err(map_db_error)?;

            let mut existing = sqlx::query_as::<_, RosterMemberModel>(&by_platform)
                .bind(applicant.platform_id.into_inner())
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_db_error)?;

            if existing.is_none() {
                if let Some(uid) = applicant.unique_game_id.as_deref() {
                    existing = sqlx::query_as::<_, RosterMemberModel>(&by_uid)
                        .bind(uid)
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(map_db_error)?;
                }
            }

            if let Some(model) = existing {
                let mut member = RosterMember::from(model);
                member.absorb_applicant(applicant, now);
                write_member(&mut *tx, &member)
                    .await
                    .map_err(|e| map_member_conflict(e, &member))?;
                tx.commit().await.map_err(map_db_error)?;
                return Ok(member);
            }

            let member = RosterMember::from_applicant(new_id, applicant, now);
            let row = RosterMemberRow::new(&member);
            let inserted = bind_member_row!(sqlx::query(&insert), row)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?
                .rows_affected();

            if inserted == 1 {
                tx.commit().await.map_err(map_db_error)?;
                return Ok(member);
            }

            tx.rollback().await.map_err(map_db_error)?;
            warn!(attempt, "Applicant insert collided with a concurrent write");
        }

        Err(DomainError::Conflict(format!(
            "roster row for applicant {} is held by another member",
            applicant.platform_id
        )))
    }

    #[instrument(skip(self))]
    async fn set_resolution(
        &self,
        id: Snowflake,
        platform_id: Snowflake,
        status: ResolutionStatus,
        resolved_by: Option<Snowflake>,
        now: DateTime<Utc>,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE clan_members
            SET discord_id = $2, resolution_status = $3, needs_resolution = FALSE,
                resolved_by = $4, resolved_at = $5, updated_at = $5
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(platform_id.into_inner())
        .bind(status.as_str())
        .bind(resolved_by.map(Snowflake::into_inner))
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, |_| DomainError::PlatformIdTaken(platform_id)))?;

        if result.rows_affected() == 0 {
            return Err(roster_member_not_found(id));
        }

        Ok(())
    }
}
