//! Application entity - one membership request

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

use super::roster_member::AcceptedApplicant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Free-form answers from the application form
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApplicationAnswers {
    pub in_game_name: Option<String>,
    pub unique_game_id: Option<String>,
    pub age: Option<String>,
    pub timezone: Option<String>,
    pub playstyle: Option<String>,
    pub why_join: Option<String>,
    pub referral: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: Snowflake,
    pub platform_id: Snowflake,
    pub display_name: String,
    pub answers: ApplicationAnswers,
    pub status: ApplicationStatus,
    /// Platform thread where review activity for this application is logged
    pub log_thread_id: Option<Snowflake>,
    pub reviewer_id: Option<Snowflake>,
    pub reviewer_note: Option<String>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub accepted_by: Option<Snowflake>,
    pub denied_at: Option<DateTime<Utc>>,
    pub denied_by: Option<Snowflake>,
    pub deny_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Application {
    pub fn new(
        id: Snowflake,
        platform_id: Snowflake,
        display_name: String,
        answers: ApplicationAnswers,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            platform_id,
            display_name,
            answers,
            status: ApplicationStatus::Pending,
            log_thread_id: None,
            reviewer_id: None,
            reviewer_note: None,
            accepted_at: None,
            accepted_by: None,
            denied_at: None,
            denied_by: None,
            deny_reason: None,
            created_at: now,
        }
    }

    fn ensure_pending(&self) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::ApplicationAlreadyReviewed(self.id));
        }
        Ok(())
    }

    /// pending -> accepted
    pub fn accept(
        &mut self,
        reviewer: Snowflake,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure_pending()?;
        self.status = ApplicationStatus::Accepted;
        self.reviewer_id = Some(reviewer);
        self.reviewer_note = note;
        self.accepted_at = Some(now);
        self.accepted_by = Some(reviewer);
        Ok(())
    }

    /// pending -> rejected
    pub fn reject(
        &mut self,
        reviewer: Snowflake,
        note: Option<String>,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure_pending()?;
        self.status = ApplicationStatus::Rejected;
        self.reviewer_id = Some(reviewer);
        self.reviewer_note = note;
        self.denied_at = Some(now);
        self.denied_by = Some(reviewer);
        self.deny_reason = reason;
        Ok(())
    }

    /// Roster data for an accepted application.
    ///
    /// The in-game name falls back to the display name when the applicant
    /// left it blank.
    pub fn accepted_applicant(&self) -> Option<AcceptedApplicant> {
        let accepted_at = self.accepted_at?;
        let in_game_name = self
            .answers
            .in_game_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.display_name)
            .to_string();

        Some(AcceptedApplicant {
            platform_id: self.platform_id,
            display_name: self.display_name.clone(),
            in_game_name,
            unique_game_id: self
                .answers
                .unique_game_id
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            accepted_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> Application {
        Application::new(
            Snowflake::new(10),
            Snowflake::new(500),
            "Applicant".to_string(),
            ApplicationAnswers::default(),
            Utc::now(),
        )
    }

    #[test]
    fn test_accept_from_pending() {
        let mut app = pending();
        let now = Utc::now();
        app.accept(Snowflake::new(1), Some("welcome".into()), now).unwrap();
        assert_eq!(app.status, ApplicationStatus::Accepted);
        assert_eq!(app.accepted_at, Some(now));
        assert_eq!(app.accepted_by, Some(Snowflake::new(1)));
    }

    #[test]
    fn test_transitions_happen_once() {
        let mut app = pending();
        app.reject(Snowflake::new(1), None, Some("too young".into()), Utc::now())
            .unwrap();
        let err = app.accept(Snowflake::new(1), None, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::ApplicationAlreadyReviewed(_)));
        assert_eq!(app.status, ApplicationStatus::Rejected);
        assert_eq!(app.deny_reason.as_deref(), Some("too young"));
    }

    #[test]
    fn test_accepted_applicant_falls_back_to_display_name() {
        let mut app = pending();
        assert!(app.accepted_applicant().is_none());

        app.answers.in_game_name = Some("   ".into());
        app.answers.unique_game_id = Some(" 8812 ".into());
        app.accept(Snowflake::new(1), None, Utc::now()).unwrap();

        let applicant = app.accepted_applicant().unwrap();
        assert_eq!(applicant.in_game_name, "Applicant");
        assert_eq!(applicant.unique_game_id.as_deref(), Some("8812"));
        assert_eq!(applicant.platform_id, Snowflake::new(500));
    }
}
