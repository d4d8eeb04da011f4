//! PostgreSQL implementation of AuditLogRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{instrument, warn};

use clan_core::{AuditEntry, AuditLogRepository, RepoResult, Snowflake};

use crate::models::AuditLogModel;

use super::error::map_db_error;

/// PostgreSQL implementation of AuditLogRepository
#[derive(Clone)]
pub struct PgAuditLogRepository {
    pool: PgPool,
}

impl PgAuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogRepository for PgAuditLogRepository {
    #[instrument(skip(self, entry), fields(action = entry.action.as_str()))]
    async fn record(&self, entry: &AuditEntry) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO audit_logs (actor_id, action, target_id, details, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(entry.actor_id.into_inner())
        .bind(entry.action.as_str())
        .bind(entry.target_id.map(Snowflake::into_inner))
        .bind(&entry.details)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_recent(&self, limit: i64) -> RepoResult<Vec<AuditEntry>> {
        let rows = sqlx::query_as::<_, AuditLogModel>(
            r"
            SELECT id, actor_id, action, target_id, details, created_at
            FROM audit_logs
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                AuditEntry::try_from(row)
                    .map_err(|action| warn!(%action, "Skipping audit row with unknown action"))
                    .ok()
            })
            .collect())
    }
}
