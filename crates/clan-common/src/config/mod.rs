//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, CooldownBackend, CorsConfig, DatabaseConfig,
    DiscordConfig, Environment, LadderRoles, RateLimitConfig, RedisConfig, RosterConfig,
    ServerConfig, SessionConfig, SnowflakeConfig,
};
