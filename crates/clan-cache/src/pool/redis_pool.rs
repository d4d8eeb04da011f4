//! Redis connection pool using deadpool-redis.
//!
//! Redis only backs the import cooldowns, so the pool exposes the two
//! primitives they need: claim a key for a window, and read what is left
//! of a claimed window.

use std::sync::Arc;

use deadpool_redis::{Config, Connection, Pool, Runtime};
use redis::AsyncCommands;

#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    /// e.g. `redis://localhost:6379`
    pub url: String,
    pub max_connections: usize,
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 8,
        }
    }
}

impl From<&clan_common::RedisConfig> for RedisPoolConfig {
    fn from(config: &clan_common::RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections as usize,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(String),

    #[error("No Redis connection available: {0}")]
    GetConnection(#[from] deadpool_redis::PoolError),

    #[error("Redis command failed: {0}")]
    Redis(#[from] redis::RedisError),
}

pub type RedisResult<T> = Result<T, RedisPoolError>;

/// Host part of a Redis URL, without credentials
fn redact_url(url: &str) -> &str {
    url.rsplit('@').next().unwrap_or(url)
}

#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("RedisPool")
            .field("size", &status.size)
            .field("available", &status.available)
            .finish()
    }
}

impl RedisPool {
    /// Build the pool. No connection is opened until first use.
    pub fn new(config: RedisPoolConfig) -> RedisResult<Self> {
        let create_error = |e: &dyn std::fmt::Display| RedisPoolError::CreatePool(e.to_string());
        let pool = Config::from_url(&config.url)
            .builder()
            .map_err(|e| create_error(&e))?
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| create_error(&e))?;

        tracing::info!(
            url = %redact_url(&config.url),
            max_connections = config.max_connections,
            "Redis pool ready"
        );
        Ok(Self { pool })
    }

    async fn connection(&self) -> RedisResult<Connection> {
        Ok(self.pool.get().await?)
    }

    /// Open connections held by the pool
    pub fn size(&self) -> usize {
        self.pool.status().size
    }

    pub async fn health_check(&self) -> RedisResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    /// `SET key 1 NX EX window`. `true` when this call opened the window.
    pub async fn claim(&self, key: &str, window_secs: u64) -> RedisResult<bool> {
        let mut conn = self.connection().await?;
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(1)
            .arg("NX")
            .arg("EX")
            .arg(window_secs)
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    /// Seconds left on a claimed key. `None` once it has expired or when it
    /// carries no expiry.
    pub async fn remaining_secs(&self, key: &str) -> RedisResult<Option<u64>> {
        let mut conn = self.connection().await?;
        let ttl: i64 = conn.ttl(key).await?;
        Ok(u64::try_from(ttl).ok())
    }
}

pub type SharedRedisPool = Arc<RedisPool>;

pub fn create_shared_pool(config: RedisPoolConfig) -> RedisResult<SharedRedisPool> {
    RedisPool::new(config).map(Arc::new)
}
