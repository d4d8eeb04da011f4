//! # clan-cache
//!
//! Redis connection pool and the cooldown stores that throttle roster
//! imports.
//!
//! ## Example
//!
//! ```ignore
//! use clan_cache::{RedisCooldownStore, RedisPool, RedisPoolConfig};
//! use clan_core::CooldownStore;
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let cooldown = RedisCooldownStore::new(pool);
//! cooldown.acquire("import:1234", 60).await?;
//! ```

pub mod cooldown;
pub mod pool;

pub use cooldown::{MemoryCooldownStore, RedisCooldownStore, COOLDOWN_PREFIX};
pub use pool::{
    create_shared_pool, RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool,
};
