//! Rank ladder engine
//!
//! Pure functions over tenure and rank. Stored roster rows only carry the
//! frozen baseline (`frozen_days`, `counting_since`); everything here is
//! recomputed from that baseline whenever a row is read or written.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entities::MemberStatus;
use crate::value_objects::Rank;

/// Tenure accrues only while a member is active and wearing the clan tag.
#[inline]
pub fn counts_tenure(status: MemberStatus, has_clan_tag: bool) -> bool {
    status == MemberStatus::Active && has_clan_tag
}

/// Whole days elapsed since `counting_since`, never negative.
pub fn days_since(counting_since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - counting_since).num_days().max(0)
}

/// `frozen_days` plus live days when counting, otherwise `frozen_days`.
pub fn effective_tenure_days(
    frozen_days: i64,
    counting_since: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> i64 {
    let live = counting_since.map_or(0, |since| days_since(since, now));
    frozen_days.max(0) + live
}

/// Highest rank whose threshold is met. Never below the entry rank.
pub fn earned_rank(days: i64) -> Rank {
    Rank::LADDER
        .into_iter()
        .rev()
        .find(|rank| rank.min_days() <= days)
        .unwrap_or(Rank::ENTRY)
}

/// The rung above `current`, whether or not its threshold is met yet.
pub fn next_rank(current: Rank) -> Option<Rank> {
    current.next()
}

pub fn promotion_eligible(
    status: MemberStatus,
    has_clan_tag: bool,
    current: Rank,
    earned: Rank,
) -> bool {
    counts_tenure(status, has_clan_tag) && earned > current && !current.is_terminal()
}

pub fn promotion_reason(days: i64, earned: Rank) -> String {
    format!(
        "{days} days in clan, meets {earned} threshold ({} days)",
        earned.min_days()
    )
}

/// Rank to keep when a declared rank (e.g. a spreadsheet column) meets a
/// computed one. Import never demotes.
pub fn kept_rank(declared: Option<Rank>, earned: Rank) -> Rank {
    declared.map_or(earned, |declared| declared.max(earned))
}

/// All derived rank fields for one member at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankProjection {
    pub tenure_days: i64,
    pub earned_rank: Rank,
    pub next_rank: Option<Rank>,
    pub promotion_eligible: bool,
    pub promotion_reason: Option<String>,
}

impl RankProjection {
    pub fn compute(
        status: MemberStatus,
        has_clan_tag: bool,
        current: Rank,
        frozen_days: i64,
        counting_since: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let tenure_days = effective_tenure_days(frozen_days, counting_since, now);
        let earned = earned_rank(tenure_days);
        let eligible = promotion_eligible(status, has_clan_tag, current, earned);

        Self {
            tenure_days,
            earned_rank: earned,
            next_rank: next_rank(current),
            promotion_eligible: eligible,
            promotion_reason: eligible.then(|| promotion_reason(tenure_days, earned)),
        }
    }
}
