//! # clan-common
//!
//! Shared utilities including configuration, error handling, session tokens, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{JwtService, SessionClaims, TokenKind};
pub use config::{
    AppConfig, AppSettings, ConfigError, CooldownBackend, CorsConfig, DatabaseConfig,
    DiscordConfig, Environment, LadderRoles, RateLimitConfig, RedisConfig, RosterConfig,
    ServerConfig, SessionConfig, SnowflakeConfig,
};
pub use error::{domain_status, AppError};
pub use telemetry::{
    try_init_tracing, try_init_tracing_with_config, LogFormat, TracingConfig, TracingError,
};
