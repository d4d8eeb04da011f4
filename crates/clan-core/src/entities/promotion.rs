//! Promotion queue item - one staged rank advancement

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{Rank, Snowflake};

/// Lifecycle of a queue item.
///
/// ```text
/// queued ──confirm──> confirmed ──process──> processed
///   │                     │   └────fail────> failed ──retry──> confirmed
///   └──remove/clear──> removed <──clear──────┴──────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Queued,
    Confirmed,
    Processed,
    Failed,
    Removed,
}

impl QueueStatus {
    pub const ALL: [QueueStatus; 5] = [
        QueueStatus::Queued,
        QueueStatus::Confirmed,
        QueueStatus::Processed,
        QueueStatus::Failed,
        QueueStatus::Removed,
    ];

    /// Statuses that count as "already in the queue" for a member
    pub const OPEN: [QueueStatus; 3] = [
        QueueStatus::Queued,
        QueueStatus::Confirmed,
        QueueStatus::Failed,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Confirmed => "confirmed",
            Self::Processed => "processed",
            Self::Failed => "failed",
            Self::Removed => "removed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    pub fn is_open(self) -> bool {
        Self::OPEN.contains(&self)
    }

    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Confirmed | Self::Removed)
                | (Self::Confirmed, Self::Processed | Self::Failed | Self::Removed)
                | (Self::Failed, Self::Confirmed | Self::Removed)
        )
    }

    pub fn transition(self, next: Self) -> Result<Self, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidTransition {
                from: self.as_str(),
                to: next.as_str(),
            })
        }
    }
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionQueueItem {
    pub id: Snowflake,
    pub member_id: Snowflake,
    pub from_rank: Rank,
    pub to_rank: Rank,
    pub tenure_days: i64,
    pub status: QueueStatus,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PromotionQueueItem {
    pub fn new(
        id: Snowflake,
        member_id: Snowflake,
        from_rank: Rank,
        to_rank: Rank,
        tenure_days: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            member_id,
            from_rank,
            to_rank,
            tenure_days,
            status: QueueStatus::Queued,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a status change in memory, enforcing the state machine.
    pub fn advance(
        &mut self,
        next: QueueStatus,
        error: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.status = self.status.transition(next)?;
        self.last_error = error;
        self.updated_at = now;
        Ok(())
    }
}
