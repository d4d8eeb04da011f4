//! Redis-backed cooldown store.

use async_trait::async_trait;
use clan_core::{CooldownStore, DomainError};
use tracing::debug;

use super::COOLDOWN_PREFIX;
use crate::pool::{RedisPool, RedisPoolError};

#[derive(Debug, Clone)]
pub struct RedisCooldownStore {
    pool: RedisPool,
}

impl RedisCooldownStore {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    fn key(key: &str) -> String {
        format!("{COOLDOWN_PREFIX}{key}")
    }
}

fn cache_error(e: RedisPoolError) -> DomainError {
    DomainError::CacheError(e.to_string())
}

#[async_trait]
impl CooldownStore for RedisCooldownStore {
    async fn acquire(&self, key: &str, window_secs: u64) -> Result<(), DomainError> {
        let redis_key = Self::key(key);
        if self
            .pool
            .claim(&redis_key, window_secs.max(1))
            .await
            .map_err(cache_error)?
        {
            return Ok(());
        }

        // The window can lapse between the two calls; report at least a second
        let retry_after_secs = self
            .pool
            .remaining_secs(&redis_key)
            .await
            .map_err(cache_error)?
            .filter(|secs| *secs > 0)
            .unwrap_or(1);
        debug!(key, retry_after_secs, "Cooldown window still open");

        Err(DomainError::RateLimited { retry_after_secs })
    }
}
