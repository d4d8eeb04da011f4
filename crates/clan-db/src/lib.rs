//! # clan-db
//!
//! Database layer implementing the clan-core repository traits with
//! PostgreSQL via SQLx.
//!
//! - Connection pool management and schema migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity <-> model mappers
//! - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use clan_db::{create_pool, run_migrations, PgRosterRepository, PoolSettings};
//! use clan_core::RosterRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolSettings::new("postgres://localhost/clan_roster", 10, 1)).await?;
//!     run_migrations(&pool).await?;
//!     let roster = PgRosterRepository::new(pool);
//!     let members = roster.list_all().await?;
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, PgPool, PoolSettings};
pub use repositories::{
    PgApplicationRepository, PgAuditLogRepository, PgPromotionQueueRepository,
    PgRosterRepository,
};
