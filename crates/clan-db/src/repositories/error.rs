//! Error handling utilities for repositories

use clan_core::{DomainError, RosterMember, Snowflake};
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce(Option<&str>) -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique(db_err.constraint());
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Unique violation on clan_members, attributed to the column that collided
pub fn map_member_conflict(e: SqlxError, member: &RosterMember) -> DomainError {
    map_unique_violation(e, |constraint| match constraint {
        Some(name) if name.contains("discord_id") => match member.platform_id {
            Some(id) => DomainError::PlatformIdTaken(id),
            None => DomainError::Conflict(name.to_string()),
        },
        Some(name) if name.contains("uid") => DomainError::UniqueGameIdTaken(
            member.unique_game_id.clone().unwrap_or_default(),
        ),
        other => DomainError::Conflict(other.unwrap_or("clan_members").to_string()),
    })
}

pub fn roster_member_not_found(id: Snowflake) -> DomainError {
    DomainError::RosterMemberNotFound(id)
}
