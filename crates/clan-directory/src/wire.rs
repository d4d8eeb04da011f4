//! Platform JSON payloads

use clan_core::{DirectoryMember, DirectoryPage, Snowflake};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct WireUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
}

/// Guild member object as returned by the members endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct WireMember {
    #[serde(default)]
    pub user: Option<WireUser>,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl WireMember {
    fn id(&self) -> Option<Snowflake> {
        Snowflake::parse(&self.user.as_ref()?.id).ok()
    }

    /// `None` for entries without a user object or with a malformed id
    pub fn into_member(self) -> Option<DirectoryMember> {
        let id = self.id()?;
        let user = self.user?;
        Some(DirectoryMember {
            id,
            username: user.username,
            global_name: user.global_name,
            nick: self.nick,
            roles: self
                .roles
                .iter()
                .filter_map(|r| Snowflake::parse(r).ok())
                .collect(),
        })
    }
}

/// Keep the raw size and cursor of a member page while dropping unusable
/// entries. The cursor is the last entry that still carries an id.
pub fn into_page(raw: Vec<WireMember>) -> DirectoryPage {
    let raw_len = raw.len();
    let last_id = raw.iter().rev().find_map(WireMember::id);
    DirectoryPage {
        members: raw.into_iter().filter_map(WireMember::into_member).collect(),
        raw_len,
        last_id,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateMessage<'a> {
    pub content: &'a str,
}
