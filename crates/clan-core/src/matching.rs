//! Name-matching engine
//!
//! Links free-text names (spreadsheet cells, staff searches) to directory
//! identities. Every candidate is scored against its username, display
//! name, and guild nickname; the best field wins.
//!
//! A query that is a field followed by trailing junk (`"Jay [420]"` for
//! user `jay`) scores as a prefix match. The field must end on a word
//! boundary of the query, so `"jayden"` does not match user `jay`.

use serde::Serialize;

use crate::entities::{DirectoryMember, GuildIdentityCandidate};
use crate::value_objects::Snowflake;

/// Default candidate window used when resolving a single name.
pub const RESOLVE_WINDOW: usize = 25;

/// Strength of a match between a query and one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchScore {
    None = 0,
    Substring = 1,
    Prefix = 2,
    Exact = 3,
}

impl MatchScore {
    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn is_match(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Lowercase, fold all whitespace runs (newlines included) to one space, trim.
pub fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn score_field(query: &str, field: Option<&str>) -> MatchScore {
    let Some(field) = field else {
        return MatchScore::None;
    };
    let field = normalize(field);
    if field.is_empty() {
        MatchScore::None
    } else if field == query {
        MatchScore::Exact
    } else if field.starts_with(query) || has_trailing_junk(query, &field) {
        MatchScore::Prefix
    } else if field.contains(query) {
        MatchScore::Substring
    } else {
        MatchScore::None
    }
}

/// `query` is `field` plus a suffix that starts at a non-alphanumeric char
fn has_trailing_junk(query: &str, field: &str) -> bool {
    query
        .strip_prefix(field)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| !c.is_alphanumeric())
}

/// Score one directory member against a query. `query` need not be normalized.
pub fn score_candidate(query: &str, member: &DirectoryMember) -> MatchScore {
    let query = normalize(query);
    score_normalized(&query, member)
}

fn score_normalized(query: &str, member: &DirectoryMember) -> MatchScore {
    if query.is_empty() {
        return MatchScore::None;
    }
    [
        Some(member.username.as_str()),
        member.global_name.as_deref(),
        member.nick.as_deref(),
    ]
    .into_iter()
    .map(|field| score_field(query, field))
    .max()
    .unwrap_or(MatchScore::None)
}

/// Matching candidates by descending score, directory order within a score.
pub fn search_candidates(
    directory: &[DirectoryMember],
    query: &str,
    limit: usize,
) -> Vec<GuildIdentityCandidate> {
    let query = normalize(query);
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(MatchScore, &DirectoryMember)> = directory
        .iter()
        .filter_map(|member| {
            let score = score_normalized(&query, member);
            score.is_match().then_some((score, member))
        })
        .collect();

    // sort_by is stable, so ties keep directory order
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.truncate(limit);

    scored
        .into_iter()
        .map(|(score, member)| GuildIdentityCandidate::from_member(member, score))
        .collect()
}

/// Outcome of resolving one name against the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub id: Option<Snowflake>,
    pub multiple: bool,
    /// Number of candidates considered (score > 0, capped at the window)
    pub candidates: usize,
}

impl Resolution {
    const fn not_found() -> Self {
        Self {
            id: None,
            multiple: false,
            candidates: 0,
        }
    }

    pub const fn is_resolved(&self) -> bool {
        self.id.is_some()
    }

    pub const fn is_ambiguous(&self) -> bool {
        self.multiple
    }
}

/// Resolve a display name to at most one identity.
///
/// A single exact match wins even when looser matches exist. Without an
/// exact match, a lone candidate is accepted. Anything else with more than
/// one candidate is ambiguous and nothing is picked.
pub fn resolve_single(display_name: &str, directory: &[DirectoryMember]) -> Resolution {
    let candidates = search_candidates(directory, display_name, RESOLVE_WINDOW);
    if candidates.is_empty() {
        return Resolution::not_found();
    }

    let exact: Vec<Snowflake> = candidates
        .iter()
        .filter(|c| c.score == MatchScore::Exact)
        .map(|c| c.platform_id)
        .collect();

    let id = match (exact.as_slice(), candidates.as_slice()) {
        ([only], _) => Some(*only),
        ([], [only]) => Some(only.platform_id),
        _ => None,
    };

    Resolution {
        id,
        multiple: id.is_none() && candidates.len() > 1,
        candidates: candidates.len(),
    }
}

/// True if any of the member's names contains the clan marker.
pub fn has_clan_tag(member: &DirectoryMember, tag: &str) -> bool {
    if tag.is_empty() {
        return false;
    }
    [
        Some(member.username.as_str()),
        member.global_name.as_deref(),
        member.nick.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|name| name.contains(tag))
}
