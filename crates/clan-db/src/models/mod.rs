//! Database models - SQLx-compatible structs for PostgreSQL tables

mod application;
mod audit_log;
mod promotion;
mod roster_member;

pub use application::ApplicationModel;
pub use audit_log::AuditLogModel;
pub use promotion::{PromotionQueueModel, QueueStatusCountModel};
pub use roster_member::{RosterMemberModel, UpsertedRosterMemberModel};
