//! Application submission and staff review
//!
//! Accepting an application runs several independent side effects (roster
//! upsert, two role changes, a log post). Each one is reported on its own
//! so staff can follow up on exactly what failed.

use clan_core::{
    AcceptedApplicant, Application, ApplicationAnswers, ApplicationStatus, AuditAction, AuditEntry,
    DomainError, Snowflake,
};
use serde_json::json;
use tracing::{error, info, instrument, warn};

use crate::dto::{
    ApplicationListResponse, ApplicationResponse, ReviewAction, ReviewApplicationRequest,
    ReviewResponse, SubmitApplicationRequest,
};

use super::auth::Caller;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct ApplicationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ApplicationService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// File a pending application for the caller.
    ///
    /// Only guild members may apply, and only one pending application per
    /// applicant is allowed (enforced by the store).
    #[instrument(skip(self, caller, request), fields(user_id = %caller.id))]
    pub async fn submit(
        &self,
        caller: &Caller,
        request: SubmitApplicationRequest,
    ) -> ServiceResult<ApplicationResponse> {
        let member = self
            .ctx
            .directory()
            .get_member(caller.id)
            .await?
            .ok_or(DomainError::NotInGuild)?;

        let answers = ApplicationAnswers {
            in_game_name: Some(request.ign.trim().to_string()),
            unique_game_id: non_blank(request.uid),
            age: non_blank(request.age),
            timezone: non_blank(request.timezone),
            playstyle: non_blank(request.playstyle),
            why_join: non_blank(request.why_join),
            referral: non_blank(request.referral),
        };

        let application = Application::new(
            self.ctx.generate_id(),
            caller.id,
            member.display_name().to_string(),
            answers,
            self.ctx.now(),
        );
        self.ctx.application_repo().create(&application).await?;
        info!(application_id = %application.id, "Application submitted");

        self.ctx
            .audit(
                AuditEntry::new(caller.id, AuditAction::ApplicationSubmitted)
                    .target(application.id),
            )
            .await;

        Ok(application.into())
    }

    /// Newest first
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        status: Option<ApplicationStatus>,
    ) -> ServiceResult<ApplicationListResponse> {
        let applications = self
            .ctx
            .application_repo()
            .list(status)
            .await?
            .iter()
            .map(ApplicationResponse::from)
            .collect();
        Ok(ApplicationListResponse { applications })
    }

    #[instrument(skip(self, request), fields(action = ?request.action))]
    pub async fn review(
        &self,
        actor_id: Snowflake,
        id: Snowflake,
        request: ReviewApplicationRequest,
    ) -> ServiceResult<ReviewResponse> {
        let application = self
            .ctx
            .application_repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Application", id.to_string()))?;

        match request.action {
            ReviewAction::Accept => self.accept(actor_id, application, request.note).await,
            ReviewAction::Reject => {
                self.reject(actor_id, application, request.note, request.deny_reason)
                    .await
            }
            ReviewAction::RetryCreateClanMember => self.retry_upsert(actor_id, application).await,
        }
    }

    /// pending -> accepted, then roster upsert, role swap and log.
    ///
    /// A failed upsert leaves the application accepted and is reported in
    /// the response; the retry action repeats just that step.
    async fn accept(
        &self,
        actor_id: Snowflake,
        mut application: Application,
        note: Option<String>,
    ) -> ServiceResult<ReviewResponse> {
        let now = self.ctx.now();
        application.accept(actor_id, non_blank(note), now)?;
        self.save_review(&application).await?;

        let upsert = match application.accepted_applicant() {
            Some(applicant) => self.upsert_member(&applicant).await,
            None => Err("accepted application has no acceptance time".to_string()),
        };

        let settings = self.ctx.settings();
        let directory = self.ctx.directory();
        let role_assigned = report(
            directory
                .assign_role(application.platform_id, settings.member_role_id)
                .await,
            "Member role assignment failed",
        );
        let role_removed = report(
            directory
                .remove_role(application.platform_id, settings.applicant_role_id)
                .await,
            "Applicant role removal failed",
        );

        let mut lines = vec![
            "**Application accepted**".to_string(),
            format!("Accepted by: <@{actor_id}>"),
        ];
        if let Some(note) = &application.reviewer_note {
            lines.push(format!("Note: {note}"));
        }
        match &upsert {
            Ok(member_id) => lines.push(format!("Clan member ID: {member_id}")),
            Err(e) => lines.push(format!(
                "Clan member creation failed: {e}\nUse retry to try again."
            )),
        }
        lines.push(format!(
            "Member role added: {}, applicant role removed: {}",
            yes_no(role_assigned),
            yes_no(role_removed)
        ));
        self.post_log(&application, &lines.join("\n")).await;

        let (action, details) = match &upsert {
            Ok(member_id) => (
                AuditAction::ApplicationAccepted,
                json!({
                    "discord_id": application.platform_id,
                    "clan_member_id": member_id,
                    "role_assigned": role_assigned,
                    "role_removed": role_removed,
                }),
            ),
            Err(e) => (
                AuditAction::ClanMemberUpsertFailedOnAccept,
                json!({
                    "discord_id": application.platform_id,
                    "error": e,
                    "role_assigned": role_assigned,
                    "role_removed": role_removed,
                }),
            ),
        };
        self.ctx
            .audit(
                AuditEntry::new(actor_id, action)
                    .target(application.id)
                    .details(details),
            )
            .await;

        let (clan_member_id, clan_member_error) = match upsert {
            Ok(id) => (Some(id), None),
            Err(e) => (None, Some(e)),
        };

        Ok(ReviewResponse {
            ok: true,
            status: ApplicationStatus::Accepted,
            role_assigned: Some(role_assigned),
            role_removed: Some(role_removed),
            clan_member_upsert_ok: Some(clan_member_error.is_none()),
            clan_member_error,
            clan_member_id,
        })
    }

    /// Repeat only the roster upsert for an accepted application
    async fn retry_upsert(
        &self,
        actor_id: Snowflake,
        application: Application,
    ) -> ServiceResult<ReviewResponse> {
        let applicant = match (application.status, application.accepted_applicant()) {
            (ApplicationStatus::Accepted, Some(applicant)) => applicant,
            _ => {
                return Err(ServiceError::validation(
                    "Application must be accepted before retrying clan member creation",
                ))
            }
        };

        let upsert = self.upsert_member(&applicant).await;

        self.ctx
            .audit(
                AuditEntry::new(actor_id, AuditAction::ClanMemberRetryFromAccept)
                    .target(application.id)
                    .details(json!({
                        "discord_id": application.platform_id,
                        "upserted": upsert.is_ok(),
                        "clan_member_id": upsert.as_ref().ok(),
                        "error": upsert.as_ref().err(),
                    })),
            )
            .await;

        match upsert {
            Ok(member_id) => {
                self.post_log(
                    &application,
                    &format!("**Retry create clan member succeeded**\nClan member ID: {member_id}"),
                )
                .await;
                Ok(ReviewResponse {
                    ok: true,
                    status: application.status,
                    role_assigned: None,
                    role_removed: None,
                    clan_member_upsert_ok: Some(true),
                    clan_member_error: None,
                    clan_member_id: Some(member_id),
                })
            }
            Err(e) => {
                self.post_log(
                    &application,
                    &format!("**Retry create clan member failed**\nError: {e}"),
                )
                .await;
                Err(ServiceError::internal(format!(
                    "Retry create clan member failed: {e}"
                )))
            }
        }
    }

    /// pending -> rejected
    async fn reject(
        &self,
        actor_id: Snowflake,
        mut application: Application,
        note: Option<String>,
        reason: Option<String>,
    ) -> ServiceResult<ReviewResponse> {
        application.reject(actor_id, non_blank(note), non_blank(reason), self.ctx.now())?;
        self.save_review(&application).await?;

        let mut lines = vec![
            "**Application denied**".to_string(),
            format!("Denied by: <@{actor_id}>"),
        ];
        if let Some(reason) = &application.deny_reason {
            lines.push(format!("Reason: {reason}"));
        }
        if let Some(note) = &application.reviewer_note {
            lines.push(format!("Note: {note}"));
        }
        self.post_log(&application, &lines.join("\n")).await;

        self.ctx
            .audit(
                AuditEntry::new(actor_id, AuditAction::ApplicationRejected)
                    .target(application.id)
                    .details(json!({
                        "discord_id": application.platform_id,
                        "deny_reason": application.deny_reason,
                    })),
            )
            .await;

        Ok(ReviewResponse::rejected())
    }

    /// Persist the review only if the application is still pending
    async fn save_review(&self, application: &Application) -> ServiceResult<()> {
        let saved = self
            .ctx
            .application_repo()
            .save_review(application, ApplicationStatus::Pending)
            .await?;
        if !saved {
            return Err(DomainError::ApplicationAlreadyReviewed(application.id).into());
        }
        info!(application_id = %application.id, status = application.status.as_str(), "Application reviewed");
        Ok(())
    }

    /// Roster upsert for an accepted applicant; the error is kept as text
    /// for the response and the audit entry.
    async fn upsert_member(&self, applicant: &AcceptedApplicant) -> Result<Snowflake, String> {
        self.ctx
            .roster_repo()
            .upsert_from_applicant(applicant, self.ctx.generate_id(), self.ctx.now())
            .await
            .map(|member| member.id)
            .map_err(|e| {
                error!(discord_id = %applicant.platform_id, error = %e, "Clan member upsert failed");
                e.to_string()
            })
    }

    /// Post to the application's thread, falling back to the log channel
    async fn post_log(&self, application: &Application, content: &str) {
        let settings = self.ctx.settings();
        let prefix = format!("[Application {}]", application.id);
        if let Err(e) = self
            .ctx
            .messaging()
            .post_with_fallback(
                application.log_thread_id.or(settings.app_log_thread_id),
                settings.app_log_channel_id,
                &prefix,
                content,
            )
            .await
        {
            warn!(application_id = %application.id, error = %e, "Application log post failed");
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn report(result: Result<(), DomainError>, what: &str) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "{what}");
            false
        }
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
