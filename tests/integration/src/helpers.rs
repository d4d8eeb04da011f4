//! Test helpers for integration tests
//!
//! Spawns the API against PostgreSQL and a [`MockPlatform`], mints session
//! tokens, and wraps the HTTP client.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use clan_api::{create_app, create_app_state};
use clan_common::{
    AppConfig, AppSettings, CooldownBackend, CorsConfig, DatabaseConfig, DiscordConfig,
    Environment, JwtService, LadderRoles, RateLimitConfig, RedisConfig, RosterConfig,
    ServerConfig, SessionConfig, SnowflakeConfig,
};
use clan_core::Snowflake;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::fixtures::{
    next_worker_id, unique_id, APPLICANT_ROLE, APP_LOG_CHANNEL, GUILD_ID, MEMBER_ROLE, PROMOTION_CHANNEL,
    STAFF_ROLE,
};
use crate::mock_platform::{MockMember, MockPlatform};

pub const SESSION_SECRET: &str = "integration-test-session-secret-0123456789";
pub const SESSION_COOKIE: &str = "session";

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub platform: MockPlatform,
    /// A guild member holding the staff role
    pub staff_id: i64,
    jwt: JwtService,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with default limits
    pub async fn start() -> Result<Self> {
        Self::start_with(|_| {}).await
    }

    /// Start a server after adjusting the roster limits
    pub async fn start_with(adjust: impl FnOnce(&mut RosterConfig)) -> Result<Self> {
        let platform = MockPlatform::start().await?;
        let mut config = test_config(&platform.api_base())?;
        adjust(&mut config.roster);

        let staff_id = unique_id();
        platform.add_member(
            MockMember::new(staff_id, format!("staff{staff_id}"))
                .role(STAFF_ROLE)
                .role(MEMBER_ROLE),
        );

        let jwt = JwtService::new(
            &config.session.secret,
            config.session.ttl_secs,
            config.session.resolve_token_ttl_secs,
        );

        let state = create_app_state(config).await?;
        let app = create_app(state);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            addr,
            client,
            platform,
            staff_id,
            jwt,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Session token for any platform user
    pub fn token_for(&self, user_id: i64) -> String {
        self.jwt
            .issue_session(Snowflake::new(user_id), Some(format!("user{user_id}")), None)
            .expect("Failed to issue session token")
    }

    pub fn staff_token(&self) -> String {
        self.token_for(self.staff_id)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    fn with_auth(request: RequestBuilder, token: &str) -> RequestBuilder {
        request.header("Authorization", format!("Bearer {token}"))
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// Make a GET request with auth token
    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(Self::with_auth(self.client.get(self.url(path)), token)
            .send()
            .await?)
    }

    /// Make a GET request carrying the session cookie instead of a header
    pub async fn get_with_cookie(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .get(self.url(path))
            .header("Cookie", format!("{SESSION_COOKIE}={token}"))
            .send()
            .await?)
    }

    /// Make a POST request with auth token
    pub async fn post_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(Self::with_auth(self.client.post(self.url(path)), token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a PATCH request with auth token
    pub async fn patch_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(Self::with_auth(self.client.patch(self.url(path)), token)
            .json(body)
            .send()
            .await?)
    }
}

/// Configuration pointing at the test database and the platform stand-in.
///
/// Cooldowns run in memory so Redis is only needed for the readiness probe.
pub fn test_config(platform_base: &str) -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")?;
    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

    Ok(AppConfig {
        app: AppSettings {
            name: "clan-roster-test".to_string(),
            env: Environment::Development,
        },
        api: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
        },
        database: DatabaseConfig {
            url: database_url,
            max_connections: 5,
            min_connections: 1,
        },
        redis: RedisConfig {
            url: redis_url,
            max_connections: 4,
        },
        session: SessionConfig {
            secret: SESSION_SECRET.to_string(),
            cookie_name: SESSION_COOKIE.to_string(),
            ttl_secs: 3600,
            resolve_token_ttl_secs: 600,
        },
        discord: DiscordConfig {
            api_base: platform_base.to_string(),
            bot_token: "test-bot-token".to_string(),
            guild_id: Snowflake::new(GUILD_ID),
            staff_role_id: Snowflake::new(STAFF_ROLE),
            member_role_id: Snowflake::new(MEMBER_ROLE),
            applicant_role_id: Snowflake::new(APPLICANT_ROLE),
            promotion_channel_id: Snowflake::new(PROMOTION_CHANNEL),
            app_log_channel_id: Snowflake::new(APP_LOG_CHANNEL),
            app_log_thread_id: None,
            http_timeout_secs: 5,
        },
        ladder: LadderRoles::default(),
        roster: RosterConfig {
            import_max_rows: 50,
            import_cooldown_secs: 60,
            promotion_confirm_min: 1,
            cooldown_backend: CooldownBackend::Memory,
            ..RosterConfig::default()
        },
        rate_limit: RateLimitConfig {
            requests_per_second: 1000,
            burst: 1000,
        },
        cors: CorsConfig::default(),
        snowflake: SnowflakeConfig {
            worker_id: next_worker_id(),
        },
    })
}

/// Helper to check if test environment is available
pub async fn check_test_env() -> bool {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }

    true
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}
