//! Server setup and initialization
//!
//! Wires the store, platform client and cooldown backend into a service
//! context and serves the router.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use clan_cache::{create_shared_pool, MemoryCooldownStore, RedisCooldownStore, RedisPoolConfig};
use clan_common::{AppConfig, AppError, CooldownBackend, JwtService};
use clan_core::{CooldownStore, SnowflakeGenerator};
use clan_db::{
    create_pool, run_migrations, PgApplicationRepository, PgAuditLogRepository,
    PgPromotionQueueRepository, PgRosterRepository, PoolSettings,
};
use clan_directory::DiscordClient;
use clan_service::services::ServiceSettings;
use clan_service::ServiceContextBuilder;
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::{apply_middleware, MiddlewareConfig};
use crate::routes::{create_router, health_routes};
use crate::state::{AppState, Dependencies};

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let config = state.config();
    let middleware = MiddlewareConfig {
        rate_limit: config.rate_limit.clone(),
        cors: config.cors.clone(),
        request_timeout: Duration::from_secs(config.api.request_timeout_secs),
        is_production: config.app.env.is_production(),
    };

    let api = apply_middleware(create_router(), &middleware);
    Router::new()
        .merge(health_routes())
        .merge(api)
        .with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let db_settings = PoolSettings::new(
        config.database.url.clone(),
        config.database.max_connections,
        config.database.min_connections,
    );
    let pool = create_pool(&db_settings)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    let (cooldowns, redis_pool) =
        match config.roster.cooldown_backend {
            CooldownBackend::Redis => {
                info!("Connecting to Redis...");
                let shared = create_shared_pool(RedisPoolConfig::from(&config.redis))
                    .map_err(|e| AppError::Cache(e.to_string()))?;
                let store = RedisCooldownStore::new(shared.as_ref().clone());
                (Arc::new(store) as Arc<dyn CooldownStore>, Some(shared))
            }
            CooldownBackend::Memory => {
                info!("Using in-process cooldown store");
                (
                    Arc::new(MemoryCooldownStore::new()) as Arc<dyn CooldownStore>,
                    None,
                )
            }
        };

    let discord = Arc::new(
        DiscordClient::from_config(&config.discord)
            .map_err(|e| AppError::Config(e.to_string()))?,
    );

    let jwt_service = Arc::new(JwtService::new(
        &config.session.secret,
        config.session.ttl_secs,
        config.session.resolve_token_ttl_secs,
    ));

    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

    let service_context = ServiceContextBuilder::new()
        .roster_repo(Arc::new(PgRosterRepository::new(pool.clone())))
        .application_repo(Arc::new(PgApplicationRepository::new(pool.clone())))
        .promotion_repo(Arc::new(PgPromotionQueueRepository::new(pool.clone())))
        .audit_repo(Arc::new(PgAuditLogRepository::new(pool.clone())))
        .directory(discord.clone())
        .messaging(discord)
        .cooldowns(cooldowns)
        .jwt_service(jwt_service)
        .snowflake_generator(snowflake_generator)
        .settings(ServiceSettings::from_config(&config))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(
        service_context,
        config,
        Dependencies {
            db: pool,
            redis: redis_pool,
        },
    ))
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid listen address: {e}")))?;

    let state = create_app_state(config).await?;
    let app = create_app(state);

    run_server(app, addr).await
}
