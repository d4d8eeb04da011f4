//! Shared handler state

use std::sync::Arc;

use clan_cache::SharedRedisPool;
use clan_common::AppConfig;
use clan_db::PgPool;
use clan_service::ServiceContext;

/// Backing stores `/ready` reports on
#[derive(Clone)]
pub struct Dependencies {
    pub db: PgPool,
    /// `None` when import cooldowns are kept in memory
    pub redis: Option<SharedRedisPool>,
}

impl Dependencies {
    pub async fn database_ok(&self) -> bool {
        self.db.acquire().await.is_ok()
    }

    /// `None` when Redis is not in use
    pub async fn redis_ok(&self) -> Option<bool> {
        match &self.redis {
            Some(pool) => Some(pool.health_check().await.is_ok()),
            None => None,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    ctx: Arc<ServiceContext>,
    config: Arc<AppConfig>,
    deps: Dependencies,
}

impl AppState {
    pub fn new(ctx: ServiceContext, config: AppConfig, deps: Dependencies) -> Self {
        Self {
            ctx: Arc::new(ctx),
            config: Arc::new(config),
            deps,
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.ctx
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn dependencies(&self) -> &Dependencies {
        &self.deps
    }

    /// Cookie carrying the session token
    pub fn session_cookie(&self) -> &str {
        &self.config.session.cookie_name
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("environment", &self.config.app.env)
            .field("redis", &self.deps.redis.is_some())
            .finish_non_exhaustive()
    }
}
