//! Spreadsheet header aliasing
//!
//! Roster exports come from hand-maintained sheets whose column names drift.
//! Headers are matched case-insensitively against a fixed alias table;
//! anything not in the table is ignored.

/// Canonical import column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportField {
    DiscordName,
    InGameName,
    Uid,
    JoinDate,
    TimeInClan,
    Rank,
    Status,
    /// Recognised but unused ("needs role updated")
    Ignored,
}

const ALIASES: &[(&str, ImportField)] = &[
    ("discord name", ImportField::DiscordName),
    ("discord_name", ImportField::DiscordName),
    ("ingame name", ImportField::InGameName),
    ("ingame_name", ImportField::InGameName),
    ("ign", ImportField::InGameName),
    ("uid", ImportField::Uid),
    ("join date", ImportField::JoinDate),
    ("join_date", ImportField::JoinDate),
    ("time in clan", ImportField::TimeInClan),
    ("time in clan (days)", ImportField::TimeInClan),
    ("time_in_clan", ImportField::TimeInClan),
    ("role given", ImportField::Rank),
    ("role_given", ImportField::Rank),
    ("role", ImportField::Rank),
    ("rank", ImportField::Rank),
    ("status", ImportField::Status),
    ("needs role updated", ImportField::Ignored),
];

/// Lowercase, trim, and fold inner whitespace runs to one space
pub fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Canonical field for a raw header, `None` for unknown headers
pub fn field_for(header: &str) -> Option<ImportField> {
    let normalized = normalize_header(header);
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, field)| *field)
}
