//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Every mutation that races with another
//! request (upserts, status transitions) is a single conditional statement
//! at the store, never a read-then-write in the caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    AcceptedApplicant, Application, ApplicationStatus, AuditEntry, PromotionQueueItem,
    QueueStatus, ResolutionStatus, RosterMember,
};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Row written by an upsert, and whether it was new
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub member: RosterMember,
    pub inserted: bool,
}

// ============================================================================
// Roster Repository
// ============================================================================

#[async_trait]
pub trait RosterRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<RosterMember>>;

    async fn find_by_platform_id(&self, platform_id: Snowflake) -> RepoResult<Option<RosterMember>>;

    /// Whole roster ordered by join date (oldest first)
    async fn list_all(&self) -> RepoResult<Vec<RosterMember>>;

    /// Rows with no platform id or flagged for resolution
    async fn list_unresolved(&self) -> RepoResult<Vec<RosterMember>>;

    /// Active, tagged rows (the ones accruing tenure)
    async fn list_counting(&self) -> RepoResult<Vec<RosterMember>>;

    /// Insert a new row. Fails with a conflict on duplicate uid/platform id.
    async fn create(&self, member: &RosterMember) -> RepoResult<()>;

    /// Overwrite an existing row by id
    async fn update(&self, member: &RosterMember) -> RepoResult<()>;

    /// Insert or update keyed on the unique game id.
    ///
    /// On update the existing row id is kept, and an existing platform
    /// identity is kept when `member` carries none.
    async fn upsert_by_unique_game_id(&self, member: &RosterMember) -> RepoResult<UpsertOutcome>;

    /// Insert or merge an accepted applicant keyed on platform id.
    ///
    /// Uses [`RosterMember::absorb_applicant`] for existing rows and
    /// [`RosterMember::from_applicant`] (with `new_id`) otherwise.
    async fn upsert_from_applicant(
        &self,
        applicant: &AcceptedApplicant,
        new_id: Snowflake,
        now: DateTime<Utc>,
    ) -> RepoResult<RosterMember>;

    /// Set identity fields only, leaving the rest of the row untouched
    async fn set_resolution(
        &self,
        id: Snowflake,
        platform_id: Snowflake,
        status: ResolutionStatus,
        resolved_by: Option<Snowflake>,
        now: DateTime<Utc>,
    ) -> RepoResult<()>;
}

// ============================================================================
// Application Repository
// ============================================================================

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Application>>;

    /// Most recent application from an applicant
    async fn find_latest_by_platform_id(
        &self,
        platform_id: Snowflake,
    ) -> RepoResult<Option<Application>>;

    /// Newest first, optionally filtered by status
    async fn list(&self, status: Option<ApplicationStatus>) -> RepoResult<Vec<Application>>;

    async fn create(&self, application: &Application) -> RepoResult<()>;

    /// Persist review fields only if the stored status is still `from`.
    ///
    /// Returns `false` when another reviewer got there first.
    async fn save_review(
        &self,
        application: &Application,
        from: ApplicationStatus,
    ) -> RepoResult<bool>;
}

// ============================================================================
// Promotion Queue Repository
// ============================================================================

#[async_trait]
pub trait PromotionQueueRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<PromotionQueueItem>>;

    /// Oldest first, optionally filtered by status
    async fn list(&self, status: Option<QueueStatus>) -> RepoResult<Vec<PromotionQueueItem>>;

    /// Insert unless the member already has an open item. Returns whether a
    /// row was written.
    async fn insert_if_absent(&self, item: &PromotionQueueItem) -> RepoResult<bool>;

    /// Move one item from `from` to `to`. Returns `false` if the item was
    /// not in `from` (someone else already moved it).
    async fn transition(
        &self,
        id: Snowflake,
        from: QueueStatus,
        to: QueueStatus,
        error: Option<&str>,
        now: DateTime<Utc>,
    ) -> RepoResult<bool>;

    /// Item count per status
    async fn count_by_status(&self) -> RepoResult<Vec<(QueueStatus, i64)>>;

    /// Mark every non-processed open item as removed. Returns rows affected.
    async fn clear_open(&self, now: DateTime<Utc>) -> RepoResult<u64>;
}

// ============================================================================
// Audit Log Repository
// ============================================================================

#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn record(&self, entry: &AuditEntry) -> RepoResult<()>;

    /// Newest first
    async fn list_recent(&self, limit: i64) -> RepoResult<Vec<AuditEntry>>;
}
