//! In-memory port implementations shared by the service tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use parking_lot::Mutex;

use clan_common::{JwtService, LadderRoles, RosterConfig};
use clan_core::{
    AcceptedApplicant, Application, ApplicationRepository, ApplicationStatus, AuditEntry,
    AuditLogRepository, CooldownStore, DirectoryMember, DirectoryPage, DirectoryResult,
    DomainError, IdentityDirectory, MessagingSink, PromotionQueueItem, PromotionQueueRepository,
    QueueStatus, RepoResult, ResolutionStatus, RosterMember, RosterRepository, Snowflake,
    SnowflakeGenerator, UpsertOutcome,
};
use clan_service::services::{Caller, ServiceContext, ServiceContextBuilder, ServiceSettings};

pub const STAFF_ROLE: i64 = 900;
pub const MEMBER_ROLE: i64 = 901;
pub const APPLICANT_ROLE: i64 = 902;
pub const PROMOTION_CHANNEL: i64 = 800;
pub const APP_LOG_CHANNEL: i64 = 801;
pub const STAFF_ID: i64 = 1;

// ============================================================================
// Roster
// ============================================================================

#[derive(Default)]
pub struct MemoryRoster {
    pub rows: Mutex<Vec<RosterMember>>,
    /// Game ids whose upsert fails
    pub failing_uids: Mutex<HashSet<String>>,
    /// Make every applicant upsert fail
    pub fail_applicant_upsert: Mutex<bool>,
}

impl MemoryRoster {
    pub fn get(&self, id: Snowflake) -> Option<RosterMember> {
        self.rows.lock().iter().find(|m| m.id == id).cloned()
    }

    pub fn by_uid(&self, uid: &str) -> Option<RosterMember> {
        self.rows
            .lock()
            .iter()
            .find(|m| m.unique_game_id.as_deref() == Some(uid))
            .cloned()
    }

    pub fn by_platform_id(&self, id: i64) -> Option<RosterMember> {
        self.rows
            .lock()
            .iter()
            .find(|m| m.platform_id == Some(Snowflake::new(id)))
            .cloned()
    }

    pub fn insert(&self, member: RosterMember) {
        self.rows.lock().push(member);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }
}

#[async_trait]
impl RosterRepository for MemoryRoster {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<RosterMember>> {
        Ok(self.get(id))
    }

    async fn find_by_platform_id(&self, platform_id: Snowflake) -> RepoResult<Option<RosterMember>> {
        Ok(self
            .rows
            .lock()
            .iter()
            .find(|m| m.platform_id == Some(platform_id))
            .cloned())
    }

    async fn list_all(&self) -> RepoResult<Vec<RosterMember>> {
        let mut rows = self.rows.lock().clone();
        rows.sort_by_key(|m| m.join_date);
        Ok(rows)
    }

    async fn list_unresolved(&self) -> RepoResult<Vec<RosterMember>> {
        Ok(self
            .rows
            .lock()
            .iter()
            .filter(|m| m.is_unresolved())
            .cloned()
            .collect())
    }

    async fn list_counting(&self) -> RepoResult<Vec<RosterMember>> {
        Ok(self
            .rows
            .lock()
            .iter()
            .filter(|m| m.is_counting())
            .cloned()
            .collect())
    }

    async fn create(&self, member: &RosterMember) -> RepoResult<()> {
        let mut rows = self.rows.lock();
        if let Some(uid) = &member.unique_game_id {
            if rows.iter().any(|m| m.unique_game_id.as_ref() == Some(uid)) {
                return Err(DomainError::UniqueGameIdTaken(uid.clone()));
            }
        }
        if let Some(pid) = member.platform_id {
            if rows.iter().any(|m| m.platform_id == Some(pid)) {
                return Err(DomainError::PlatformIdTaken(pid));
            }
        }
        rows.push(member.clone());
        Ok(())
    }

    async fn update(&self, member: &RosterMember) -> RepoResult<()> {
        let mut rows = self.rows.lock();
        let slot = rows
            .iter_mut()
            .find(|m| m.id == member.id)
            .ok_or(DomainError::RosterMemberNotFound(member.id))?;
        *slot = member.clone();
        Ok(())
    }

    async fn upsert_by_unique_game_id(&self, member: &RosterMember) -> RepoResult<UpsertOutcome> {
        let uid = member
            .unique_game_id
            .clone()
            .ok_or_else(|| DomainError::ValidationError("uid is required".into()))?;
        if self.failing_uids.lock().contains(&uid) {
            return Err(DomainError::DatabaseError("connection reset".into()));
        }

        let mut rows = self.rows.lock();
        match rows
            .iter_mut()
            .find(|m| m.unique_game_id.as_deref() == Some(uid.as_str()))
        {
            Some(existing) => {
                let mut merged = member.clone();
                merged.id = existing.id;
                merged.created_at = existing.created_at;
                if merged.platform_id.is_none() {
                    merged.platform_id = existing.platform_id;
                    merged.needs_resolution = existing.needs_resolution;
                    merged.resolution_status = existing.resolution_status;
                    merged.resolved_at = existing.resolved_at;
                    merged.resolved_by = existing.resolved_by;
                }
                *existing = merged.clone();
                Ok(UpsertOutcome {
                    member: merged,
                    inserted: false,
                })
            }
            None => {
                rows.push(member.clone());
                Ok(UpsertOutcome {
                    member: member.clone(),
                    inserted: true,
                })
            }
        }
    }

    async fn upsert_from_applicant(
        &self,
        applicant: &AcceptedApplicant,
        new_id: Snowflake,
        now: DateTime<Utc>,
    ) -> RepoResult<RosterMember> {
        if *self.fail_applicant_upsert.lock() {
            return Err(DomainError::DatabaseError("clan_members unavailable".into()));
        }

        let mut rows = self.rows.lock();
        let position = rows
            .iter()
            .position(|m| m.platform_id == Some(applicant.platform_id))
            .or_else(|| {
                let uid = applicant.unique_game_id.as_deref()?;
                rows.iter().position(|m| {
                    m.platform_id.is_none() && m.unique_game_id.as_deref() == Some(uid)
                })
            });

        match position {
            Some(index) => {
                rows[index].absorb_applicant(applicant, now);
                Ok(rows[index].clone())
            }
            None => {
                let member = RosterMember::from_applicant(new_id, applicant, now);
                rows.push(member.clone());
                Ok(member)
            }
        }
    }

    async fn set_resolution(
        &self,
        id: Snowflake,
        platform_id: Snowflake,
        status: ResolutionStatus,
        resolved_by: Option<Snowflake>,
        now: DateTime<Utc>,
    ) -> RepoResult<()> {
        let mut rows = self.rows.lock();
        let member = rows
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(DomainError::RosterMemberNotFound(id))?;
        member.mark_resolved(platform_id, status, resolved_by, now);
        Ok(())
    }
}

// ============================================================================
// Applications
// ============================================================================

#[derive(Default)]
pub struct MemoryApplications {
    pub rows: Mutex<Vec<Application>>,
}

impl MemoryApplications {
    pub fn get(&self, id: Snowflake) -> Option<Application> {
        self.rows.lock().iter().find(|a| a.id == id).cloned()
    }
}

#[async_trait]
impl ApplicationRepository for MemoryApplications {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Application>> {
        Ok(self.get(id))
    }

    async fn find_latest_by_platform_id(
        &self,
        platform_id: Snowflake,
    ) -> RepoResult<Option<Application>> {
        Ok(self
            .rows
            .lock()
            .iter()
            .filter(|a| a.platform_id == platform_id)
            .max_by_key(|a| a.created_at)
            .cloned())
    }

    async fn list(&self, status: Option<ApplicationStatus>) -> RepoResult<Vec<Application>> {
        let mut rows: Vec<Application> = self
            .rows
            .lock()
            .iter()
            .filter(|a| status.map_or(true, |s| a.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn create(&self, application: &Application) -> RepoResult<()> {
        let mut rows = self.rows.lock();
        if rows.iter().any(|a| {
            a.platform_id == application.platform_id && a.status == ApplicationStatus::Pending
        }) {
            return Err(DomainError::ApplicationPending);
        }
        rows.push(application.clone());
        Ok(())
    }

    async fn save_review(
        &self,
        application: &Application,
        from: ApplicationStatus,
    ) -> RepoResult<bool> {
        let mut rows = self.rows.lock();
        match rows
            .iter_mut()
            .find(|a| a.id == application.id && a.status == from)
        {
            Some(slot) => {
                *slot = application.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ============================================================================
// Promotion queue
// ============================================================================

#[derive(Default)]
pub struct MemoryQueue {
    pub items: Mutex<Vec<PromotionQueueItem>>,
    /// Transitions into this status fail with a store error
    pub fail_transition_to: Mutex<Option<QueueStatus>>,
}

impl MemoryQueue {
    pub fn get(&self, id: Snowflake) -> Option<PromotionQueueItem> {
        self.items.lock().iter().find(|i| i.id == id).cloned()
    }

    pub fn with_status(&self, status: QueueStatus) -> Vec<PromotionQueueItem> {
        self.items
            .lock()
            .iter()
            .filter(|i| i.status == status)
            .cloned()
            .collect()
    }

    pub fn for_member(&self, member_id: Snowflake) -> Option<PromotionQueueItem> {
        self.items
            .lock()
            .iter()
            .find(|i| i.member_id == member_id)
            .cloned()
    }
}

#[async_trait]
impl PromotionQueueRepository for MemoryQueue {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<PromotionQueueItem>> {
        Ok(self.get(id))
    }

    async fn list(&self, status: Option<QueueStatus>) -> RepoResult<Vec<PromotionQueueItem>> {
        Ok(self
            .items
            .lock()
            .iter()
            .filter(|i| status.map_or(true, |s| i.status == s))
            .cloned()
            .collect())
    }

    async fn insert_if_absent(&self, item: &PromotionQueueItem) -> RepoResult<bool> {
        let mut items = self.items.lock();
        if items
            .iter()
            .any(|i| i.member_id == item.member_id && i.status.is_open())
        {
            return Ok(false);
        }
        items.push(item.clone());
        Ok(true)
    }

    async fn transition(
        &self,
        id: Snowflake,
        from: QueueStatus,
        to: QueueStatus,
        error: Option<&str>,
        now: DateTime<Utc>,
    ) -> RepoResult<bool> {
        if *self.fail_transition_to.lock() == Some(to) {
            return Err(DomainError::DatabaseError("connection reset".into()));
        }
        let mut items = self.items.lock();
        match items.iter_mut().find(|i| i.id == id && i.status == from) {
            Some(item) => {
                item.advance(to, error.map(str::to_string), now)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_by_status(&self) -> RepoResult<Vec<(QueueStatus, i64)>> {
        let mut counts: HashMap<QueueStatus, i64> = HashMap::new();
        for item in self.items.lock().iter() {
            *counts.entry(item.status).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn clear_open(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let mut cleared = 0;
        for item in self.items.lock().iter_mut().filter(|i| i.status.is_open()) {
            item.status = QueueStatus::Removed;
            item.updated_at = now;
            cleared += 1;
        }
        Ok(cleared)
    }
}

// ============================================================================
// Audit
// ============================================================================

#[derive(Default)]
pub struct MemoryAudit {
    pub entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAudit {
    pub fn actions(&self) -> Vec<&'static str> {
        self.entries.lock().iter().map(|e| e.action.as_str()).collect()
    }

    pub fn last(&self) -> Option<AuditEntry> {
        self.entries.lock().last().cloned()
    }
}

#[async_trait]
impl AuditLogRepository for MemoryAudit {
    async fn record(&self, entry: &AuditEntry) -> RepoResult<()> {
        self.entries.lock().push(entry.clone());
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> RepoResult<Vec<AuditEntry>> {
        let entries = self.entries.lock();
        Ok(entries
            .iter()
            .rev()
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }
}

// ============================================================================
// Platform
// ============================================================================

#[derive(Default)]
pub struct FakeDirectory {
    pub members: Mutex<Vec<DirectoryMember>>,
    /// Every page request fails
    pub unavailable: Mutex<bool>,
    /// Users whose role assignment fails
    pub failing_users: Mutex<HashSet<Snowflake>>,
    pub assigned: Mutex<Vec<(Snowflake, Snowflake)>>,
    pub removed: Mutex<Vec<(Snowflake, Snowflake)>>,
}

impl FakeDirectory {
    pub fn add(&self, member: DirectoryMember) {
        self.members.lock().push(member);
    }
}

#[async_trait]
impl IdentityDirectory for FakeDirectory {
    async fn list_page(
        &self,
        after: Snowflake,
        limit: usize,
    ) -> DirectoryResult<DirectoryPage> {
        if *self.unavailable.lock() {
            return Err(DomainError::ExternalService("502 Bad Gateway".into()));
        }
        let mut members: Vec<DirectoryMember> = self
            .members
            .lock()
            .iter()
            .filter(|m| m.id > after)
            .cloned()
            .collect();
        members.sort_by_key(|m| m.id);
        members.truncate(limit);
        Ok(DirectoryPage::from_members(members))
    }

    async fn get_member(&self, id: Snowflake) -> DirectoryResult<Option<DirectoryMember>> {
        Ok(self.members.lock().iter().find(|m| m.id == id).cloned())
    }

    async fn assign_role(&self, user_id: Snowflake, role_id: Snowflake) -> DirectoryResult<()> {
        if self.failing_users.lock().contains(&user_id) {
            return Err(DomainError::ExternalService("403 Missing Permissions".into()));
        }
        self.assigned.lock().push((user_id, role_id));
        Ok(())
    }

    async fn remove_role(&self, user_id: Snowflake, role_id: Snowflake) -> DirectoryResult<()> {
        self.removed.lock().push((user_id, role_id));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeMessaging {
    pub posted: Mutex<Vec<(Snowflake, String)>>,
    pub unavailable: Mutex<bool>,
}

#[async_trait]
impl MessagingSink for FakeMessaging {
    async fn post_message(&self, channel_id: Snowflake, content: &str) -> DirectoryResult<()> {
        if *self.unavailable.lock() {
            return Err(DomainError::ExternalService("503 Service Unavailable".into()));
        }
        self.posted.lock().push((channel_id, content.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCooldowns {
    pub open: Mutex<HashSet<String>>,
}

#[async_trait]
impl CooldownStore for MemoryCooldowns {
    async fn acquire(&self, key: &str, window_secs: u64) -> Result<(), DomainError> {
        if !self.open.lock().insert(key.to_string()) {
            return Err(DomainError::RateLimited {
                retry_after_secs: window_secs,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct TestApp {
    pub ctx: ServiceContext,
    pub roster: Arc<MemoryRoster>,
    pub applications: Arc<MemoryApplications>,
    pub queue: Arc<MemoryQueue>,
    pub audit: Arc<MemoryAudit>,
    pub directory: Arc<FakeDirectory>,
    pub messaging: Arc<FakeMessaging>,
    pub cooldowns: Arc<MemoryCooldowns>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_roster_config(RosterConfig {
            import_max_rows: 10,
            import_cooldown_secs: 60,
            promotion_confirm_min: 2,
            clan_tag: "420".into(),
            page_size: 50,
            ..RosterConfig::default()
        })
    }

    pub fn with_roster_config(roster_config: RosterConfig) -> Self {
        let roster = Arc::new(MemoryRoster::default());
        let applications = Arc::new(MemoryApplications::default());
        let queue = Arc::new(MemoryQueue::default());
        let audit = Arc::new(MemoryAudit::default());
        let directory = Arc::new(FakeDirectory::default());
        let messaging = Arc::new(FakeMessaging::default());
        let cooldowns = Arc::new(MemoryCooldowns::default());

        let settings = ServiceSettings {
            staff_role_id: Snowflake::new(STAFF_ROLE),
            member_role_id: Snowflake::new(MEMBER_ROLE),
            applicant_role_id: Snowflake::new(APPLICANT_ROLE),
            promotion_channel_id: Snowflake::new(PROMOTION_CHANNEL),
            app_log_channel_id: Snowflake::new(APP_LOG_CHANNEL),
            app_log_thread_id: None,
            ladder: LadderRoles::default(),
            roster: roster_config,
        };

        let ctx = ServiceContextBuilder::new()
            .roster_repo(roster.clone())
            .application_repo(applications.clone())
            .promotion_repo(queue.clone())
            .audit_repo(audit.clone())
            .directory(directory.clone())
            .messaging(messaging.clone())
            .cooldowns(cooldowns.clone())
            .jwt_service(Arc::new(JwtService::new(
                "test-secret-for-clan-service-tests",
                3600,
                300,
            )))
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(1)))
            .settings(settings)
            .build()
            .expect("all dependencies provided");

        Self {
            ctx,
            roster,
            applications,
            queue,
            audit,
            directory,
            messaging,
            cooldowns,
        }
    }

    pub fn staff() -> Snowflake {
        Snowflake::new(STAFF_ID)
    }

    pub fn caller(id: i64) -> Caller {
        Caller {
            id: Snowflake::new(id),
            username: Some(format!("user{id}")),
            avatar: None,
        }
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn guild_member(id: i64, username: &str, nick: Option<&str>) -> DirectoryMember {
    DirectoryMember {
        id: Snowflake::new(id),
        username: username.to_string(),
        global_name: None,
        nick: nick.map(str::to_string),
        roles: Vec::new(),
    }
}

pub fn with_roles(mut member: DirectoryMember, roles: &[i64]) -> DirectoryMember {
    member.roles = roles.iter().copied().map(Snowflake::new).collect();
    member
}

pub fn days_ago(days: i64) -> NaiveDate {
    (Utc::now() - Duration::days(days)).date_naive()
}

/// Active, tagged, resolved member who joined `days` ago
pub fn counting_member(id: i64, platform_id: Option<i64>, name: &str, days: i64) -> RosterMember {
    let now = Utc::now();
    RosterMember::new(
        Snowflake::new(id),
        name.to_string(),
        format!("{name}IGN"),
        days_ago(days),
        now,
    )
    .with_unique_game_id(format!("UID{id}"))
    .with_membership(clan_core::MemberStatus::Active, true, 0)
    .with_platform_id(platform_id.map(Snowflake::new))
}
