//! External platform ports: identity directory, messaging, cooldowns

use async_trait::async_trait;

use crate::entities::DirectoryMember;
use crate::error::DomainError;
use crate::value_objects::Snowflake;

pub type DirectoryResult<T> = Result<T, DomainError>;

/// Largest page the platform's member list endpoint returns
pub const DIRECTORY_PAGE_LIMIT: usize = 1000;

/// Members fetched by a full directory walk.
///
/// `error` is set when a page failed and the walk stopped early; `members`
/// then holds whatever came back before the failure.
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    pub members: Vec<DirectoryMember>,
    pub error: Option<String>,
}

impl DirectorySnapshot {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    pub fn get(&self, id: Snowflake) -> Option<&DirectoryMember> {
        self.members.iter().find(|m| m.id == id)
    }
}

/// One page of the member list.
///
/// `members` holds the usable entries. `raw_len` and `last_id` describe the
/// page as the platform sent it, before malformed entries were dropped, and
/// are what paging decides on.
#[derive(Debug, Clone, Default)]
pub struct DirectoryPage {
    pub members: Vec<DirectoryMember>,
    pub raw_len: usize,
    pub last_id: Option<Snowflake>,
}

impl DirectoryPage {
    /// Page where every entry was usable
    pub fn from_members(members: Vec<DirectoryMember>) -> Self {
        Self {
            raw_len: members.len(),
            last_id: members.last().map(|m| m.id),
            members,
        }
    }
}

/// Guild membership and role management on the chat platform
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// One page of members with ids greater than `after`
    async fn list_page(&self, after: Snowflake, limit: usize) -> DirectoryResult<DirectoryPage>;

    /// `None` when the user is not in the guild
    async fn get_member(&self, id: Snowflake) -> DirectoryResult<Option<DirectoryMember>>;

    async fn assign_role(&self, user_id: Snowflake, role_id: Snowflake) -> DirectoryResult<()>;

    async fn remove_role(&self, user_id: Snowflake, role_id: Snowflake) -> DirectoryResult<()>;

    /// Page through the whole directory, cursor = last id seen.
    ///
    /// Stops on a short or empty raw page. A failed page, or a full page the
    /// cursor cannot advance past, ends the walk and the partial result is
    /// returned with the error attached.
    async fn list_all_members(&self) -> DirectorySnapshot {
        let mut snapshot = DirectorySnapshot::default();
        let mut after = Snowflake::new(0);

        loop {
            match self.list_page(after, DIRECTORY_PAGE_LIMIT).await {
                Ok(page) => {
                    snapshot.members.extend(page.members);
                    if page.raw_len < DIRECTORY_PAGE_LIMIT {
                        break;
                    }
                    match page.last_id {
                        Some(id) if id > after => after = id,
                        _ => {
                            snapshot.error =
                                Some(format!("member page after {after} gave no usable cursor"));
                            break;
                        }
                    }
                }
                Err(e) => {
                    snapshot.error = Some(e.to_string());
                    break;
                }
            }
        }

        snapshot
    }
}

/// Append-only message posting
#[async_trait]
pub trait MessagingSink: Send + Sync {
    async fn post_message(&self, channel_id: Snowflake, content: &str) -> DirectoryResult<()>;

    /// Post to `thread_id`; if absent or failing, post to `channel_id` with
    /// `prefix` so the message can still be attributed.
    async fn post_with_fallback(
        &self,
        thread_id: Option<Snowflake>,
        channel_id: Snowflake,
        prefix: &str,
        content: &str,
    ) -> DirectoryResult<Snowflake> {
        if let Some(thread_id) = thread_id {
            if self.post_message(thread_id, content).await.is_ok() {
                return Ok(thread_id);
            }
        }
        self.post_message(channel_id, &format!("{prefix} {content}"))
            .await?;
        Ok(channel_id)
    }
}

/// Advisory per-key cooldown
#[async_trait]
pub trait CooldownStore: Send + Sync {
    /// Start a cooldown window for `key`.
    ///
    /// Fails with [`DomainError::RateLimited`] if a window is already open.
    async fn acquire(&self, key: &str, window_secs: u64) -> Result<(), DomainError>;
}
