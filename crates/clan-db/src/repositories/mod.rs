//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in clan-core.

mod application;
mod audit_log;
mod error;
mod promotion_queue;
mod roster;

pub use application::PgApplicationRepository;
pub use audit_log::PgAuditLogRepository;
pub use promotion_queue::PgPromotionQueueRepository;
pub use roster::PgRosterRepository;
