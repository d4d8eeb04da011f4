//! Directory member - a platform identity as seen by the guild directory

use serde::{Deserialize, Serialize};

use crate::matching::MatchScore;
use crate::value_objects::Snowflake;

/// Guild member record from the identity directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryMember {
    pub id: Snowflake,
    pub username: String,
    pub global_name: Option<String>,
    pub nick: Option<String>,
    pub roles: Vec<Snowflake>,
}

impl DirectoryMember {
    /// Nickname, then global name, then username
    pub fn display_name(&self) -> &str {
        self.nick
            .as_deref()
            .or(self.global_name.as_deref())
            .unwrap_or(&self.username)
    }

    #[inline]
    pub fn has_role(&self, role_id: Snowflake) -> bool {
        self.roles.contains(&role_id)
    }
}

/// Search result for a name query. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuildIdentityCandidate {
    pub platform_id: Snowflake,
    pub display_name: String,
    pub username: String,
    pub nick: Option<String>,
    pub score: MatchScore,
}

impl GuildIdentityCandidate {
    pub fn from_member(member: &DirectoryMember, score: MatchScore) -> Self {
        Self {
            platform_id: member.id,
            display_name: member
                .global_name
                .clone()
                .unwrap_or_else(|| member.username.clone()),
            username: member.username.clone(),
            nick: member.nick.clone(),
            score,
        }
    }
}
