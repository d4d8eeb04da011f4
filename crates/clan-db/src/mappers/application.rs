//! Application entity <-> model mapper

use clan_core::{Application, ApplicationStatus, Snowflake};

use crate::models::ApplicationModel;

/// Convert ApplicationModel to Application entity
impl From<ApplicationModel> for Application {
    fn from(model: ApplicationModel) -> Self {
        Application {
            id: Snowflake::new(model.id),
            platform_id: Snowflake::new(model.discord_id),
            display_name: model.display_name,
            answers: model.answers.0,
            status: ApplicationStatus::parse(&model.status).unwrap_or_default(),
            log_thread_id: model.log_thread_id.map(Snowflake::new),
            reviewer_id: model.reviewer_id.map(Snowflake::new),
            reviewer_note: model.reviewer_note,
            accepted_at: model.accepted_at,
            accepted_by: model.accepted_by.map(Snowflake::new),
            denied_at: model.denied_at,
            denied_by: model.denied_by.map(Snowflake::new),
            deny_reason: model.deny_reason,
            created_at: model.created_at,
        }
    }
}
