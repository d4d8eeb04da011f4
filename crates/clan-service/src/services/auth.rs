//! Caller identity and the staff capability
//!
//! Sessions are issued elsewhere (platform OAuth); this service only reads
//! them. Staff status is checked live against the guild directory on every
//! call, never cached in the session.

use clan_core::{DirectoryMember, DomainError, Snowflake};
use tracing::{debug, instrument, warn};

use crate::dto::{ApplicationSummary, MeResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// An authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: Snowflake,
    pub username: Option<String>,
    pub avatar: Option<String>,
}

/// Session and staff checks
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Decode a session token into the caller it names
    pub fn authenticate(&self, token: &str) -> ServiceResult<Caller> {
        let claims = self.ctx.jwt_service().validate_session(token)?;
        Ok(Caller {
            id: claims.subject_id()?,
            username: claims.username,
            avatar: claims.avatar,
        })
    }

    /// The caller's guild record, if they hold the staff role.
    ///
    /// Callers outside the guild are treated the same as non-staff.
    #[instrument(skip(self))]
    pub async fn require_staff(&self, user_id: Snowflake) -> ServiceResult<DirectoryMember> {
        let member = self.ctx.directory().get_member(user_id).await?;
        match member {
            Some(member) if member.has_role(self.ctx.settings().staff_role_id) => Ok(member),
            _ => {
                debug!(%user_id, "Staff check failed");
                Err(DomainError::MissingStaffRole.into())
            }
        }
    }

    /// Guild standing and latest application for the caller.
    ///
    /// A directory failure reports the caller as outside the guild rather
    /// than failing the request.
    #[instrument(skip(self, caller), fields(user_id = %caller.id))]
    pub async fn me(&self, caller: &Caller) -> ServiceResult<MeResponse> {
        let member = match self.ctx.directory().get_member(caller.id).await {
            Ok(member) => member,
            Err(e) => {
                warn!(error = %e, "Guild lookup failed for /me");
                None
            }
        };

        let settings = self.ctx.settings();
        let has = |role| member.as_ref().is_some_and(|m| m.has_role(role));

        let application = self
            .ctx
            .application_repo()
            .find_latest_by_platform_id(caller.id)
            .await?;

        Ok(MeResponse {
            discord_id: caller.id,
            username: caller.username.clone(),
            avatar: caller.avatar.clone(),
            in_guild: member.is_some(),
            is_staff: has(settings.staff_role_id),
            is_member: has(settings.member_role_id),
            application: application.as_ref().map(ApplicationSummary::from),
        })
    }
}
