//! Rank - a rung on the clan's static rank ladder

use serde::{Deserialize, Serialize};
use std::fmt;

/// Clan rank, ordered from entry rank to terminal rank.
///
/// The ladder is fixed at compile time. Each rank carries the minimum
/// cumulative tenure (in days) required to earn it. The platform role that
/// represents a rank is deployment configuration and lives outside the
/// domain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Rank {
    #[default]
    Private,
    Corporal,
    Sergeant,
    Lieutenant,
    Major,
}

impl Rank {
    /// Every rank in ascending order
    pub const LADDER: [Rank; 5] = [
        Rank::Private,
        Rank::Corporal,
        Rank::Sergeant,
        Rank::Lieutenant,
        Rank::Major,
    ];

    pub const ENTRY: Rank = Rank::Private;
    pub const TERMINAL: Rank = Rank::Major;

    /// Minimum tenure in days needed to earn this rank
    pub const fn min_days(self) -> i64 {
        match self {
            Self::Private => 0,
            Self::Corporal => 14,
            Self::Sergeant => 30,
            Self::Lieutenant => 60,
            Self::Major => 90,
        }
    }

    /// Position on the ladder (0 = entry rank)
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::LADDER.get(index).copied()
    }

    /// The rank immediately above this one, if any
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Major)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Private => "Private",
            Self::Corporal => "Corporal",
            Self::Sergeant => "Sergeant",
            Self::Lieutenant => "Lieutenant",
            Self::Major => "Major",
        }
    }

    /// Case-insensitive lookup by name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::LADDER
            .into_iter()
            .find(|rank| rank.as_str().eq_ignore_ascii_case(name))
    }

    /// Lookup that treats unknown or blank names as the entry rank.
    ///
    /// Spreadsheet rank columns are free text, so anything unrecognised is
    /// read as "no rank yet".
    pub fn from_name_or_entry(name: &str) -> Self {
        Self::from_name(name).unwrap_or(Self::ENTRY)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rank: {0}")]
pub struct RankParseError(pub String);

impl std::str::FromStr for Rank {
    type Err = RankParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| RankParseError(s.to_string()))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
