//! # clan-core
//!
//! Domain layer for the clan roster: entities, value objects, the rank ladder
//! and name-matching engines, and the port traits implemented by the
//! infrastructure crates. Nothing in here talks to a database or the network.

pub mod entities;
pub mod error;
pub mod ladder;
pub mod matching;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    AcceptedApplicant, Application, ApplicationAnswers, ApplicationStatus, AuditAction,
    AuditEntry, DirectoryMember, GuildIdentityCandidate, MemberSource, MemberStatus,
    PromotionQueueItem, QueueStatus, ResolutionStatus, RosterFilter, RosterMember,
};
pub use error::DomainError;
pub use ladder::RankProjection;
pub use matching::{MatchScore, Resolution};
pub use traits::{
    ApplicationRepository, AuditLogRepository, CooldownStore, DirectoryPage, DirectoryResult, DirectorySnapshot,
    IdentityDirectory, MessagingSink, PromotionQueueRepository, RepoResult, RosterRepository,
    UpsertOutcome,
};
pub use value_objects::{Rank, RankParseError, Snowflake, SnowflakeGenerator, SnowflakeParseError};
