//! Per-key cooldown windows
//!
//! Two [`CooldownStore`](clan_core::CooldownStore) backends: Redis, shared
//! by every API instance, and an in-process map that resets on restart.

mod memory;
mod redis_store;

pub use memory::MemoryCooldownStore;
pub use redis_store::RedisCooldownStore;

/// Key prefix for cooldown windows
pub const COOLDOWN_PREFIX: &str = "cooldown:";
