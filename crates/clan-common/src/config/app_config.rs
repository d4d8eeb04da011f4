//! Application configuration structs
//!
//! Loads configuration from environment variables (and `.env` if present).

use clan_core::{Rank, Snowflake};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub session: SessionConfig,
    pub discord: DiscordConfig,
    pub ladder: LadderRoles,
    pub roster: RosterConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Session cookie / bearer token settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub cookie_name: String,
    pub ttl_secs: i64,
    /// Lifetime of the opaque tokens handed out by guild member search
    pub resolve_token_ttl_secs: i64,
}

/// Chat platform bot credentials and guild wiring
#[derive(Clone)]
pub struct DiscordConfig {
    pub api_base: String,
    pub bot_token: String,
    pub guild_id: Snowflake,
    pub staff_role_id: Snowflake,
    pub member_role_id: Snowflake,
    /// Role held while an application is in progress; removed on accept
    pub applicant_role_id: Snowflake,
    pub promotion_channel_id: Snowflake,
    pub app_log_channel_id: Snowflake,
    /// Review log thread for applications that have none of their own
    pub app_log_thread_id: Option<Snowflake>,
    pub http_timeout_secs: u64,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("api_base", &self.api_base)
            .field("guild_id", &self.guild_id)
            .field("staff_role_id", &self.staff_role_id)
            .field("member_role_id", &self.member_role_id)
            .field("applicant_role_id", &self.applicant_role_id)
            .field("promotion_channel_id", &self.promotion_channel_id)
            .field("app_log_channel_id", &self.app_log_channel_id)
            .field("app_log_thread_id", &self.app_log_thread_id)
            .finish_non_exhaustive()
    }
}

/// Platform role granted for each rank above the entry rank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LadderRoles {
    pub corporal: Snowflake,
    pub sergeant: Snowflake,
    pub lieutenant: Snowflake,
    pub major: Snowflake,
}

impl Default for LadderRoles {
    fn default() -> Self {
        Self {
            corporal: Snowflake::new(1_374_050_435_484_094_525),
            sergeant: Snowflake::new(1_378_450_788_069_933_206),
            lieutenant: Snowflake::new(1_378_450_714_845_778_022),
            major: Snowflake::new(1_378_450_739_885_637_702),
        }
    }
}

impl LadderRoles {
    /// The entry rank has no role of its own
    pub fn role_for(&self, rank: Rank) -> Option<Snowflake> {
        match rank {
            Rank::Private => None,
            Rank::Corporal => Some(self.corporal),
            Rank::Sergeant => Some(self.sergeant),
            Rank::Lieutenant => Some(self.lieutenant),
            Rank::Major => Some(self.major),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CooldownBackend {
    #[default]
    Redis,
    Memory,
}

/// Roster tooling limits
#[derive(Debug, Clone)]
pub struct RosterConfig {
    pub import_max_rows: usize,
    pub import_cooldown_secs: u64,
    pub promotion_confirm_min: usize,
    pub clan_tag: String,
    pub page_size: usize,
    pub cooldown_backend: CooldownBackend,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            import_max_rows: default_import_max_rows(),
            import_cooldown_secs: default_import_cooldown_secs(),
            promotion_confirm_min: default_promotion_confirm_min(),
            clan_tag: default_clan_tag(),
            page_size: default_page_size(),
            cooldown_backend: CooldownBackend::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst: u32,
}

#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SnowflakeConfig {
    pub worker_id: u16,
}

// Default value functions
fn default_app_name() -> String {
    "clan-roster".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_cookie_name() -> String {
    "session".to_string()
}

fn default_session_ttl_secs() -> i64 {
    604_800 // 7 days
}

fn default_resolve_token_ttl_secs() -> i64 {
    600
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_http_timeout_secs() -> u64 {
    15
}

fn default_import_max_rows() -> usize {
    5000
}

fn default_import_cooldown_secs() -> u64 {
    60
}

fn default_promotion_confirm_min() -> usize {
    5
}

fn default_clan_tag() -> String {
    "420".to_string()
}

fn default_page_size() -> usize {
    50
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn optional<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        _ => Ok(None),
    }
}

fn or_default<T: FromStr>(name: &'static str, default: fn() -> T) -> Result<T, ConfigError> {
    Ok(optional(name)?.unwrap_or_else(default))
}

fn required<T: FromStr>(name: &'static str) -> Result<T, ConfigError> {
    optional(name)?.ok_or(ConfigError::MissingVar(name))
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or
    /// a variable cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let ladder_defaults = LadderRoles::default();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            api: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| default_host()),
                port: or_default("API_PORT", default_port)?,
                request_timeout_secs: or_default(
                    "REQUEST_TIMEOUT_SECS",
                    default_request_timeout_secs,
                )?,
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: or_default("DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: or_default("DATABASE_MIN_CONNECTIONS", default_min_connections)?,
            },
            redis: RedisConfig {
                url: required("REDIS_URL")?,
                max_connections: or_default("REDIS_MAX_CONNECTIONS", default_redis_max_connections)?,
            },
            session: SessionConfig {
                secret: required("SESSION_SECRET")?,
                cookie_name: env::var("SESSION_COOKIE_NAME")
                    .unwrap_or_else(|_| default_cookie_name()),
                ttl_secs: or_default("SESSION_TTL_SECS", default_session_ttl_secs)?,
                resolve_token_ttl_secs: or_default(
                    "RESOLVE_TOKEN_TTL_SECS",
                    default_resolve_token_ttl_secs,
                )?,
            },
            discord: DiscordConfig {
                api_base: env::var("DISCORD_API_BASE").unwrap_or_else(|_| default_api_base()),
                bot_token: required("DISCORD_BOT_TOKEN")?,
                guild_id: required("DISCORD_GUILD_ID")?,
                staff_role_id: required("DISCORD_STAFF_ROLE_ID")?,
                member_role_id: required("DISCORD_MEMBER_ROLE_ID")?,
                applicant_role_id: required("DISCORD_APPLICANT_ROLE_ID")?,
                promotion_channel_id: required("DISCORD_PROMOTION_CHANNEL_ID")?,
                app_log_channel_id: required("DISCORD_APP_LOG_CHANNEL_ID")?,
                app_log_thread_id: optional("DISCORD_APP_LOG_THREAD_ID")?,
                http_timeout_secs: or_default(
                    "DISCORD_HTTP_TIMEOUT_SECS",
                    default_http_timeout_secs,
                )?,
            },
            ladder: LadderRoles {
                corporal: optional("RANK_ROLE_CORPORAL")?.unwrap_or(ladder_defaults.corporal),
                sergeant: optional("RANK_ROLE_SERGEANT")?.unwrap_or(ladder_defaults.sergeant),
                lieutenant: optional("RANK_ROLE_LIEUTENANT")?
                    .unwrap_or(ladder_defaults.lieutenant),
                major: optional("RANK_ROLE_MAJOR")?.unwrap_or(ladder_defaults.major),
            },
            roster: RosterConfig {
                import_max_rows: or_default("IMPORT_MAX_ROWS", default_import_max_rows)?,
                import_cooldown_secs: or_default(
                    "IMPORT_COOLDOWN_SECS",
                    default_import_cooldown_secs,
                )?,
                promotion_confirm_min: or_default(
                    "PROMOTION_CONFIRM_MIN",
                    default_promotion_confirm_min,
                )?,
                clan_tag: env::var("CLAN_TAG").unwrap_or_else(|_| default_clan_tag()),
                page_size: or_default("ROSTER_PAGE_SIZE", default_page_size)?,
                cooldown_backend: match env::var("COOLDOWN_BACKEND") {
                    Ok(v) if v.eq_ignore_ascii_case("memory") => CooldownBackend::Memory,
                    Ok(v) if v.eq_ignore_ascii_case("redis") || v.is_empty() => {
                        CooldownBackend::Redis
                    }
                    Ok(v) => return Err(ConfigError::InvalidValue("COOLDOWN_BACKEND", v)),
                    Err(_) => CooldownBackend::default(),
                },
            },
            rate_limit: RateLimitConfig {
                requests_per_second: or_default(
                    "RATE_LIMIT_REQUESTS_PER_SECOND",
                    default_requests_per_second,
                )?,
                burst: or_default("RATE_LIMIT_BURST", default_burst)?,
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .ok()
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            snowflake: SnowflakeConfig {
                worker_id: optional("WORKER_ID")?.unwrap_or(0),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
