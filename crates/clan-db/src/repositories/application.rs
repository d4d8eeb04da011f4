//! PostgreSQL implementation of ApplicationRepository

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::instrument;

use clan_core::{
    Application, ApplicationRepository, ApplicationStatus, DomainError, RepoResult, Snowflake,
};

use crate::models::ApplicationModel;

use super::error::{map_db_error, map_unique_violation};

const APPLICATION_COLUMNS: &str = "id, discord_id, display_name, answers, status, \
    log_thread_id, reviewer_id, reviewer_note, accepted_at, accepted_by, denied_at, denied_by, \
    deny_reason, created_at";

/// PostgreSQL implementation of ApplicationRepository
#[derive(Clone)]
pub struct PgApplicationRepository {
    pool: PgPool,
}

impl PgApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Application>> {
        let sql = format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1");
        let result = sqlx::query_as::<_, ApplicationModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(Application::from))
    }

    #[instrument(skip(self))]
    async fn find_latest_by_platform_id(
        &self,
        platform_id: Snowflake,
    ) -> RepoResult<Option<Application>> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE discord_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT 1"
        );
        let result = sqlx::query_as::<_, ApplicationModel>(&sql)
            .bind(platform_id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(Application::from))
    }

    #[instrument(skip(self))]
    async fn list(&self, status: Option<ApplicationStatus>) -> RepoResult<Vec<Application>> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications \
             WHERE ($1::TEXT IS NULL OR status = $1) \
             ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, ApplicationModel>(&sql)
            .bind(status.map(ApplicationStatus::as_str))
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Application::from).collect())
    }

    #[instrument(skip(self, application), fields(application_id = %application.id))]
    async fn create(&self, application: &Application) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO applications (id, discord_id, display_name, answers, status, log_thread_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(application.id.into_inner())
        .bind(application.platform_id.into_inner())
        .bind(&application.display_name)
        .bind(Json(&application.answers))
        .bind(application.status.as_str())
        .bind(application.log_thread_id.map(Snowflake::into_inner))
        .bind(application.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, |_| DomainError::ApplicationPending))?;

        Ok(())
    }

    #[instrument(skip(self, application), fields(application_id = %application.id, to = application.status.as_str()))]
    async fn save_review(
        &self,
        application: &Application,
        from: ApplicationStatus,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE applications
            SET status = $3, reviewer_id = $4, reviewer_note = $5, accepted_at = $6,
                accepted_by = $7, denied_at = $8, denied_by = $9, deny_reason = $10,
                log_thread_id = $11
            WHERE id = $1 AND status = $2
            ",
        )
        .bind(application.id.into_inner())
        .bind(from.as_str())
        .bind(application.status.as_str())
        .bind(application.reviewer_id.map(Snowflake::into_inner))
        .bind(&application.reviewer_note)
        .bind(application.accepted_at)
        .bind(application.accepted_by.map(Snowflake::into_inner))
        .bind(application.denied_at)
        .bind(application.denied_by.map(Snowflake::into_inner))
        .bind(&application.deny_reason)
        .bind(application.log_thread_id.map(Snowflake::into_inner))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
