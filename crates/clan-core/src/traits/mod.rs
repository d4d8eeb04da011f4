//! Port traits implemented by the infrastructure crates

mod directory;
mod repositories;

pub use directory::{
    CooldownStore, DirectoryPage, DirectoryResult, DirectorySnapshot, IdentityDirectory,
    MessagingSink, DIRECTORY_PAGE_LIMIT,
};
pub use repositories::{
    ApplicationRepository, AuditLogRepository, PromotionQueueRepository, RepoResult,
    RosterRepository, UpsertOutcome,
};
