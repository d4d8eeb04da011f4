//! PostgreSQL implementation of PromotionQueueRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use clan_core::{
    PromotionQueueItem, PromotionQueueRepository, QueueStatus, RepoResult, Snowflake,
};

use crate::mappers::open_statuses_sql;
use crate::models::{PromotionQueueModel, QueueStatusCountModel};

use super::error::map_db_error;

const QUEUE_COLUMNS: &str = "id, clan_member_id, from_rank, to_rank, tenure_days, status, \
    last_error, created_at, updated_at";

/// PostgreSQL implementation of PromotionQueueRepository
#[derive(Clone)]
pub struct PgPromotionQueueRepository {
    pool: PgPool,
}

impl PgPromotionQueueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PromotionQueueRepository for PgPromotionQueueRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<PromotionQueueItem>> {
        let sql = format!("SELECT {QUEUE_COLUMNS} FROM promotion_queue WHERE id = $1");
        let result = sqlx::query_as::<_, PromotionQueueModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(PromotionQueueItem::from))
    }

    #[instrument(skip(self))]
    async fn list(&self, status: Option<QueueStatus>) -> RepoResult<Vec<PromotionQueueItem>> {
        let sql = format!(
            "SELECT {QUEUE_COLUMNS} FROM promotion_queue \
             WHERE ($1::TEXT IS NULL OR status = $1) \
             ORDER BY created_at ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, PromotionQueueModel>(&sql)
            .bind(status.map(QueueStatus::as_str))
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(PromotionQueueItem::from).collect())
    }

    #[instrument(skip(self, item), fields(member_id = %item.member_id))]
    async fn insert_if_absent(&self, item: &PromotionQueueItem) -> RepoResult<bool> {
        let sql = format!(
            r"
            INSERT INTO promotion_queue ({QUEUE_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (clan_member_id) WHERE status IN {open} DO NOTHING
            ",
            open = open_statuses_sql()
        );
        let result = sqlx::query(&sql)
            .bind(item.id.into_inner())
            .bind(item.member_id.into_inner())
            .bind(item.from_rank.as_str())
            .bind(item.to_rank.as_str())
            .bind(item.tenure_days)
            .bind(item.status.as_str())
            .bind(&item.last_error)
            .bind(item.created_at)
            .bind(item.updated_at)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn transition(
        &self,
        id: Snowflake,
        from: QueueStatus,
        to: QueueStatus,
        error: Option<&str>,
        now: DateTime<Utc>,
    ) -> RepoResult<bool> {
        from.transition(to)?;

        let result = sqlx::query(
            r"
            UPDATE promotion_queue
            SET status = $3, last_error = $4, updated_at = $5
            WHERE id = $1 AND status = $2
            ",
        )
        .bind(id.into_inner())
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(error)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn count_by_status(&self) -> RepoResult<Vec<(QueueStatus, i64)>> {
        let rows = sqlx::query_as::<_, QueueStatusCountModel>(
            r"
            SELECT status, COUNT(*) AS count
            FROM promotion_queue
            GROUP BY status
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows
            .into_iter()
            .filter_map(|row| QueueStatus::parse(&row.status).map(|s| (s, row.count)))
            .collect())
    }

    #[instrument(skip(self))]
    async fn clear_open(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let sql = format!(
            "UPDATE promotion_queue SET status = $1, updated_at = $2 WHERE status IN {open}",
            open = open_statuses_sql()
        );
        let result = sqlx::query(&sql)
            .bind(QueueStatus::Removed.as_str())
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
