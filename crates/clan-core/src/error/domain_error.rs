//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Roster member not found: {0}")]
    RosterMemberNotFound(Snowflake),

    #[error("Application not found: {0}")]
    ApplicationNotFound(Snowflake),

    #[error("Promotion queue item not found: {0}")]
    QueueItemNotFound(Snowflake),

    #[error("Not a member of the guild: {0}")]
    DirectoryMemberNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Batch too large: {got} rows (max {max})")]
    BatchTooLarge { max: usize, got: usize },

    #[error("Confirmation required for destructive action")]
    ConfirmationRequired,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Staff role required")]
    MissingStaffRole,

    #[error("Guild membership required")]
    NotInGuild,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Game id already on the roster: {0}")]
    UniqueGameIdTaken(String),

    #[error("Platform id already on the roster: {0}")]
    PlatformIdTaken(Snowflake),

    #[error("Application already reviewed: {0}")]
    ApplicationAlreadyReviewed(Snowflake),

    #[error("Applicant already has a pending application")]
    ApplicationPending,

    #[error("Invalid queue transition: {from} -> {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("Store conflict: {0}")]
    Conflict(String),

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Not enough confirmable items: {eligible} of {required}")]
    BelowConfirmThreshold { required: usize, eligible: usize },

    #[error("Rate limited, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::RosterMemberNotFound(_) => "UNKNOWN_ROSTER_MEMBER",
            Self::ApplicationNotFound(_) => "UNKNOWN_APPLICATION",
            Self::QueueItemNotFound(_) => "UNKNOWN_QUEUE_ITEM",
            Self::DirectoryMemberNotFound(_) => "UNKNOWN_GUILD_MEMBER",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::BatchTooLarge { .. } => "BATCH_TOO_LARGE",
            Self::ConfirmationRequired => "CONFIRMATION_REQUIRED",

            // Authorization
            Self::Unauthenticated => "UNAUTHORIZED",
            Self::MissingStaffRole => "MISSING_STAFF_ROLE",
            Self::NotInGuild => "NOT_IN_GUILD",

            // Conflict
            Self::UniqueGameIdTaken(_) => "UID_ALREADY_EXISTS",
            Self::PlatformIdTaken(_) => "PLATFORM_ID_ALREADY_EXISTS",
            Self::ApplicationAlreadyReviewed(_) => "APPLICATION_ALREADY_REVIEWED",
            Self::ApplicationPending => "APPLICATION_PENDING",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Conflict(_) => "CONFLICT",

            // Business Rules
            Self::BelowConfirmThreshold { .. } => "BELOW_CONFIRM_THRESHOLD",
            Self::RateLimited { .. } => "RATE_LIMITED",

            // Infrastructure
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RosterMemberNotFound(_)
                | Self::ApplicationNotFound(_)
                | Self::QueueItemNotFound(_)
                | Self::DirectoryMemberNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::BatchTooLarge { .. }
                | Self::ConfirmationRequired
                | Self::BelowConfirmThreshold { .. }
        )
    }

    /// Check if this is an authentication or authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated | Self::MissingStaffRole | Self::NotInGuild
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::UniqueGameIdTaken(_)
                | Self::PlatformIdTaken(_)
                | Self::ApplicationAlreadyReviewed(_)
                | Self::ApplicationPending
                | Self::InvalidTransition { .. }
                | Self::Conflict(_)
        )
    }

    /// Infrastructure failures (store, cache, external API)
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::ExternalService(_)
                | Self::DatabaseError(_)
                | Self::CacheError(_)
                | Self::InternalError(_)
        )
    }
}
