//! Bot-authenticated client for guild members, roles, and channel messages

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, instrument, warn};

use clan_common::DiscordConfig;
use clan_core::{
    DirectoryMember, DirectoryPage, DirectoryResult, DomainError, IdentityDirectory, MessagingSink,
    Snowflake,
};

use crate::wire::{into_page, CreateMessage, WireMember};

#[derive(Debug, Clone)]
pub struct DirectoryClientConfig {
    /// API root, e.g. `https://discord.com/api/v10`
    pub api_base: String,
    pub bot_token: String,
    pub guild_id: Snowflake,
    pub timeout: Duration,
}

impl From<&DiscordConfig> for DirectoryClientConfig {
    fn from(config: &DiscordConfig) -> Self {
        Self {
            api_base: config.api_base.clone(),
            bot_token: config.bot_token.clone(),
            guild_id: config.guild_id,
            timeout: Duration::from_secs(config.http_timeout_secs),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryClientError {
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct DiscordClient {
    http: Client,
    base_url: String,
    guild_id: Snowflake,
    auth_header: String,
}

impl DiscordClient {
    pub fn new(config: DirectoryClientConfig) -> Result<Self, DirectoryClientError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            guild_id: config.guild_id,
            auth_header: format!("Bot {}", config.bot_token),
        })
    }

    pub fn from_config(config: &DiscordConfig) -> Result<Self, DirectoryClientError> {
        Self::new(DirectoryClientConfig::from(config))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn member_path(&self, user_id: Snowflake) -> String {
        format!("/guilds/{}/members/{}", self.guild_id, user_id)
    }

    fn role_path(&self, user_id: Snowflake, role_id: Snowflake) -> String {
        format!("{}/roles/{}", self.member_path(user_id), role_id)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
    }

    /// Send and turn transport failures and non-2xx replies into domain errors.
    /// `404` is returned to the caller as `Ok(None)`.
    async fn send(&self, request: RequestBuilder, what: &str) -> DirectoryResult<Option<Response>> {
        let response = request
            .send()
            .await
            .map_err(|e| DomainError::ExternalService(format!("{what}: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(Some(response));
        }
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();
        warn!(%status, what, body = %truncate(&body, 200), "Platform request failed");

        Err(status_error(status, what, retry_after.as_deref()))
    }

    async fn send_required(&self, request: RequestBuilder, what: &str) -> DirectoryResult<Response> {
        self.send(request, what)
            .await?
            .ok_or_else(|| DomainError::ExternalService(format!("{what}: 404 Not Found")))
    }
}

fn status_error(status: StatusCode, what: &str, retry_after: Option<&str>) -> DomainError {
    match (status, retry_after) {
        (StatusCode::TOO_MANY_REQUESTS, Some(after)) => {
            DomainError::ExternalService(format!("{what}: rate limited, retry after {after}s"))
        }
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => DomainError::ExternalService(
            format!("{what}: bot lacks access ({status})"),
        ),
        _ => DomainError::ExternalService(format!("{what}: {status}")),
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[async_trait]
impl IdentityDirectory for DiscordClient {
    #[instrument(skip(self))]
    async fn list_page(&self, after: Snowflake, limit: usize) -> DirectoryResult<DirectoryPage> {
        let path = format!("/guilds/{}/members", self.guild_id);
        let request = self
            .request(Method::GET, &path)
            .query(&[("limit", limit.to_string()), ("after", after.to_string())]);

        let response = self.send_required(request, "list guild members").await?;
        let page: Vec<WireMember> = response
            .json()
            .await
            .map_err(|e| DomainError::ExternalService(format!("list guild members: {e}")))?;

        let page = into_page(page);
        if page.members.len() < page.raw_len {
            warn!(
                dropped = page.raw_len - page.members.len(),
                "Skipped member entries without a usable user"
            );
        }
        debug!(count = page.members.len(), "Fetched member page");
        Ok(page)
    }

    #[instrument(skip(self))]
    async fn get_member(&self, id: Snowflake) -> DirectoryResult<Option<DirectoryMember>> {
        let request = self.request(Method::GET, &self.member_path(id));
        let Some(response) = self.send(request, "get guild member").await? else {
            return Ok(None);
        };

        let wire: WireMember = response
            .json()
            .await
            .map_err(|e| DomainError::ExternalService(format!("get guild member: {e}")))?;
        Ok(wire.into_member())
    }

    #[instrument(skip(self))]
    async fn assign_role(&self, user_id: Snowflake, role_id: Snowflake) -> DirectoryResult<()> {
        let request = self.request(Method::PUT, &self.role_path(user_id, role_id));
        self.send_required(request, "assign role").await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_role(&self, user_id: Snowflake, role_id: Snowflake) -> DirectoryResult<()> {
        let request = self.request(Method::DELETE, &self.role_path(user_id, role_id));
        self.send_required(request, "remove role").await?;
        Ok(())
    }
}

#[async_trait]
impl MessagingSink for DiscordClient {
    #[instrument(skip(self, content), fields(len = content.len()))]
    async fn post_message(&self, channel_id: Snowflake, content: &str) -> DirectoryResult<()> {
        let path = format!("/channels/{channel_id}/messages");
        let request = self
            .request(Method::POST, &path)
            .json(&CreateMessage { content });
        self.send_required(request, "post message").await?;
        Ok(())
    }
}
