//! Domain entities - core business objects

mod application;
mod audit;
mod directory;
mod promotion;
mod roster_member;

pub use application::{Application, ApplicationAnswers, ApplicationStatus};
pub use audit::{AuditAction, AuditEntry};
pub use directory::{DirectoryMember, GuildIdentityCandidate};
pub use promotion::{PromotionQueueItem, QueueStatus};
pub use roster_member::{
    start_of_day, AcceptedApplicant, MemberSource, MemberStatus, ResolutionStatus, RosterFilter,
    RosterMember,
};
