//! Service context - dependency container for services
//!
//! Holds the port implementations (store, directory, messaging, cooldowns)
//! and the deployment settings every service reads.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use clan_common::{AppConfig, JwtService, LadderRoles, RosterConfig};
use clan_core::{
    ApplicationRepository, AuditEntry, AuditLogRepository, CooldownStore, IdentityDirectory,
    MessagingSink, PromotionQueueRepository, RosterRepository, Snowflake, SnowflakeGenerator,
};
use tracing::warn;

use super::error::{ServiceError, ServiceResult};

/// Guild roles, channels and roster limits
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub staff_role_id: Snowflake,
    pub member_role_id: Snowflake,
    /// Role held while an application is open; removed on accept
    pub applicant_role_id: Snowflake,
    pub promotion_channel_id: Snowflake,
    pub app_log_channel_id: Snowflake,
    pub app_log_thread_id: Option<Snowflake>,
    pub ladder: LadderRoles,
    pub roster: RosterConfig,
}

impl ServiceSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            staff_role_id: config.discord.staff_role_id,
            member_role_id: config.discord.member_role_id,
            applicant_role_id: config.discord.applicant_role_id,
            promotion_channel_id: config.discord.promotion_channel_id,
            app_log_channel_id: config.discord.app_log_channel_id,
            app_log_thread_id: config.discord.app_log_thread_id,
            ladder: config.ladder.clone(),
            roster: config.roster.clone(),
        }
    }
}

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Store
    roster_repo: Arc<dyn RosterRepository>,
    application_repo: Arc<dyn ApplicationRepository>,
    promotion_repo: Arc<dyn PromotionQueueRepository>,
    audit_repo: Arc<dyn AuditLogRepository>,

    // Platform
    directory: Arc<dyn IdentityDirectory>,
    messaging: Arc<dyn MessagingSink>,

    cooldowns: Arc<dyn CooldownStore>,

    jwt_service: Arc<JwtService>,
    snowflake_generator: Arc<SnowflakeGenerator>,
    settings: Arc<ServiceSettings>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        roster_repo: Arc<dyn RosterRepository>,
        application_repo: Arc<dyn ApplicationRepository>,
        promotion_repo: Arc<dyn PromotionQueueRepository>,
        audit_repo: Arc<dyn AuditLogRepository>,
        directory: Arc<dyn IdentityDirectory>,
        messaging: Arc<dyn MessagingSink>,
        cooldowns: Arc<dyn CooldownStore>,
        jwt_service: Arc<JwtService>,
        snowflake_generator: Arc<SnowflakeGenerator>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            roster_repo,
            application_repo,
            promotion_repo,
            audit_repo,
            directory,
            messaging,
            cooldowns,
            jwt_service,
            snowflake_generator,
            settings: Arc::new(settings),
        }
    }

    // === Store ===

    pub fn roster_repo(&self) -> &dyn RosterRepository {
        self.roster_repo.as_ref()
    }

    pub fn application_repo(&self) -> &dyn ApplicationRepository {
        self.application_repo.as_ref()
    }

    pub fn promotion_repo(&self) -> &dyn PromotionQueueRepository {
        self.promotion_repo.as_ref()
    }

    pub fn audit_repo(&self) -> &dyn AuditLogRepository {
        self.audit_repo.as_ref()
    }

    // === Platform ===

    /// Guild member directory and role management
    pub fn directory(&self) -> &dyn IdentityDirectory {
        self.directory.as_ref()
    }

    pub fn messaging(&self) -> &dyn MessagingSink {
        self.messaging.as_ref()
    }

    pub fn cooldowns(&self) -> &dyn CooldownStore {
        self.cooldowns.as_ref()
    }

    // === Misc ===

    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    pub fn settings(&self) -> &ServiceSettings {
        self.settings.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }

    pub fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    /// Append an audit entry. A failed write is logged and otherwise ignored.
    pub async fn audit(&self, entry: AuditEntry) {
        if let Err(e) = self.audit_repo.record(&entry).await {
            warn!(action = entry.action.as_str(), error = %e, "Audit write failed");
        }
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("platform", &"...")
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    roster_repo: Option<Arc<dyn RosterRepository>>,
    application_repo: Option<Arc<dyn ApplicationRepository>>,
    promotion_repo: Option<Arc<dyn PromotionQueueRepository>>,
    audit_repo: Option<Arc<dyn AuditLogRepository>>,
    directory: Option<Arc<dyn IdentityDirectory>>,
    messaging: Option<Arc<dyn MessagingSink>>,
    cooldowns: Option<Arc<dyn CooldownStore>>,
    jwt_service: Option<Arc<JwtService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    settings: Option<ServiceSettings>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roster_repo(mut self, repo: Arc<dyn RosterRepository>) -> Self {
        self.roster_repo = Some(repo);
        self
    }

    pub fn application_repo(mut self, repo: Arc<dyn ApplicationRepository>) -> Self {
        self.application_repo = Some(repo);
        self
    }

    pub fn promotion_repo(mut self, repo: Arc<dyn PromotionQueueRepository>) -> Self {
        self.promotion_repo = Some(repo);
        self
    }

    pub fn audit_repo(mut self, repo: Arc<dyn AuditLogRepository>) -> Self {
        self.audit_repo = Some(repo);
        self
    }

    pub fn directory(mut self, directory: Arc<dyn IdentityDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn messaging(mut self, messaging: Arc<dyn MessagingSink>) -> Self {
        self.messaging = Some(messaging);
        self
    }

    pub fn cooldowns(mut self, cooldowns: Arc<dyn CooldownStore>) -> Self {
        self.cooldowns = Some(cooldowns);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn settings(mut self, settings: ServiceSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
            value.ok_or_else(|| ServiceError::validation(format!("{name} is required")))
        }

        Ok(ServiceContext::new(
            required(self.roster_repo, "roster_repo")?,
            required(self.application_repo, "application_repo")?,
            required(self.promotion_repo, "promotion_repo")?,
            required(self.audit_repo, "audit_repo")?,
            required(self.directory, "directory")?,
            required(self.messaging, "messaging")?,
            required(self.cooldowns, "cooldowns")?,
            required(self.jwt_service, "jwt_service")?,
            required(self.snowflake_generator, "snowflake_generator")?,
            required(self.settings, "settings")?,
        ))
    }
}
