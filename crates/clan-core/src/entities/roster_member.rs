//! Roster member entity - one tracked clan member

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ladder::{self, RankProjection};
use crate::value_objects::{Rank, Snowflake};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    #[default]
    Active,
    Inactive,
}

impl MemberStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Lenient parse for spreadsheet cells: anything but "inactive" is active.
    pub fn from_cell(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("inactive") {
            Self::Inactive
        } else {
            Self::Active
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    #[default]
    Unresolved,
    ResolvedAuto,
    ResolvedManual,
}

impl ResolutionStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unresolved => "unresolved",
            Self::ResolvedAuto => "resolved_auto",
            Self::ResolvedManual => "resolved_manual",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "unresolved" => Some(Self::Unresolved),
            "resolved_auto" => Some(Self::ResolvedAuto),
            "resolved_manual" => Some(Self::ResolvedManual),
            _ => None,
        }
    }
}

/// Where a roster row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberSource {
    Csv,
    #[default]
    Manual,
    Application,
}

impl MemberSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Manual => "manual",
            Self::Application => "application",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "csv" => Some(Self::Csv),
            "manual" => Some(Self::Manual),
            "application" => Some(Self::Application),
            _ => None,
        }
    }
}

/// Roster member entity.
///
/// `frozen_days` and `counting_since` are the stored tenure baseline.
/// `counting_since` is set exactly when the member is active and tagged.
/// `next_rank`, `promotion_eligible` and `promotion_reason` are a cached
/// projection refreshed by [`RosterMember::refresh_derived`] on every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterMember {
    pub id: Snowflake,
    pub platform_id: Option<Snowflake>,
    pub display_name: String,
    pub in_game_name: String,
    pub unique_game_id: Option<String>,
    pub status: MemberStatus,
    pub has_clan_tag: bool,
    pub join_date: NaiveDate,
    pub frozen_days: i64,
    pub counting_since: Option<DateTime<Utc>>,
    pub current_rank: Rank,
    pub next_rank: Option<Rank>,
    pub promotion_eligible: bool,
    pub promotion_reason: Option<String>,
    pub needs_resolution: bool,
    pub resolution_status: ResolutionStatus,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<Snowflake>,
    pub source: MemberSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RosterMember {
    /// New active, untagged, entry-rank member with no platform identity.
    pub fn new(
        id: Snowflake,
        display_name: String,
        in_game_name: String,
        join_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            platform_id: None,
            display_name,
            in_game_name,
            unique_game_id: None,
            status: MemberStatus::Active,
            has_clan_tag: false,
            join_date,
            frozen_days: 0,
            counting_since: None,
            current_rank: Rank::ENTRY,
            next_rank: Rank::ENTRY.next(),
            promotion_eligible: false,
            promotion_reason: None,
            needs_resolution: true,
            resolution_status: ResolutionStatus::Unresolved,
            resolved_at: None,
            resolved_by: None,
            source: MemberSource::Manual,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_unique_game_id(mut self, uid: impl Into<String>) -> Self {
        self.unique_game_id = Some(uid.into());
        self
    }

    pub fn with_rank(mut self, rank: Rank) -> Self {
        self.current_rank = rank;
        self
    }

    pub fn with_source(mut self, source: MemberSource) -> Self {
        self.source = source;
        self
    }

    /// Set initial membership and tenure baseline.
    ///
    /// A counting member accrues from the join date. A frozen member starts
    /// from `carried_days` (e.g. a spreadsheet's "time in clan").
    pub fn with_membership(mut self, status: MemberStatus, has_clan_tag: bool, carried_days: i64) -> Self {
        self.status = status;
        self.has_clan_tag = has_clan_tag;
        if ladder::counts_tenure(status, has_clan_tag) {
            self.frozen_days = 0;
            self.counting_since = Some(start_of_day(self.join_date));
        } else {
            self.frozen_days = carried_days.max(0);
            self.counting_since = None;
        }
        self
    }

    /// Attach a platform identity found without staff input.
    pub fn with_platform_id(mut self, platform_id: Option<Snowflake>) -> Self {
        self.platform_id = platform_id;
        self.needs_resolution = platform_id.is_none();
        if platform_id.is_some() {
            self.resolution_status = ResolutionStatus::ResolvedAuto;
            self.resolved_at = Some(self.updated_at);
        }
        self
    }

    #[inline]
    pub fn is_counting(&self) -> bool {
        ladder::counts_tenure(self.status, self.has_clan_tag)
    }

    /// `counting_since` is present exactly when tenure is accruing
    pub fn tenure_baseline_consistent(&self) -> bool {
        self.counting_since.is_some() == self.is_counting()
    }

    pub fn tenure_days(&self, now: DateTime<Utc>) -> i64 {
        ladder::effective_tenure_days(self.frozen_days, self.counting_since, now)
    }

    pub fn projection(&self, now: DateTime<Utc>) -> RankProjection {
        RankProjection::compute(
            self.status,
            self.has_clan_tag,
            self.current_rank,
            self.frozen_days,
            self.counting_since,
            now,
        )
    }

    /// Change status/tag, freezing or unfreezing tenure on the transition.
    ///
    /// Leaving the counting state rolls live days into `frozen_days`;
    /// entering it starts counting at `now`. Derived fields are refreshed.
    pub fn set_membership(&mut self, status: MemberStatus, has_clan_tag: bool, now: DateTime<Utc>) {
        let was_counting = self.is_counting();
        let now_counting = ladder::counts_tenure(status, has_clan_tag);

        if was_counting && !now_counting {
            self.frozen_days = self.tenure_days(now);
            self.counting_since = None;
        } else if !was_counting && now_counting {
            self.counting_since = Some(now);
        }

        self.status = status;
        self.has_clan_tag = has_clan_tag;
        self.refresh_derived(now);
    }

    /// Recompute the cached projection fields together.
    pub fn refresh_derived(&mut self, now: DateTime<Utc>) -> RankProjection {
        let projection = self.projection(now);
        self.next_rank = projection.next_rank;
        self.promotion_eligible = projection.promotion_eligible;
        self.promotion_reason.clone_from(&projection.promotion_reason);
        self.updated_at = now;
        projection
    }

    pub fn mark_resolved(
        &mut self,
        platform_id: Snowflake,
        status: ResolutionStatus,
        resolved_by: Option<Snowflake>,
        now: DateTime<Utc>,
    ) {
        self.platform_id = Some(platform_id);
        self.needs_resolution = false;
        self.resolution_status = status;
        self.resolved_at = Some(now);
        self.resolved_by = resolved_by;
        self.updated_at = now;
    }

    pub fn is_unresolved(&self) -> bool {
        self.platform_id.is_none() || self.needs_resolution
    }

    /// Drop the platform identity and flag the row for resolution.
    pub fn clear_resolution(&mut self, now: DateTime<Utc>) {
        self.platform_id = None;
        self.needs_resolution = true;
        self.resolution_status = ResolutionStatus::Unresolved;
        self.resolved_at = None;
        self.resolved_by = None;
        self.updated_at = now;
    }

    /// Move to a new rank after roles were applied.
    pub fn promote_to(&mut self, rank: Rank, now: DateTime<Utc>) {
        self.current_rank = rank;
        self.refresh_derived(now);
    }

    /// Merge an accepted applicant into this row.
    ///
    /// Join date and game id are kept when already set. The member is
    /// reset to active, untagged, entry rank; being untagged freezes
    /// tenure, so previously accrued days stay in `frozen_days`.
    pub fn absorb_applicant(&mut self, applicant: &AcceptedApplicant, now: DateTime<Utc>) {
        self.platform_id = Some(applicant.platform_id);
        self.display_name.clone_from(&applicant.display_name);
        self.in_game_name.clone_from(&applicant.in_game_name);
        if self.unique_game_id.is_none() {
            self.unique_game_id.clone_from(&applicant.unique_game_id);
        }
        self.current_rank = Rank::ENTRY;
        self.source = MemberSource::Application;
        self.set_membership(MemberStatus::Active, false, now);
        self.mark_resolved(applicant.platform_id, ResolutionStatus::ResolvedAuto, None, now);
    }

    /// Fresh roster row for an applicant with no existing entry.
    pub fn from_applicant(id: Snowflake, applicant: &AcceptedApplicant, now: DateTime<Utc>) -> Self {
        let mut member = Self::new(
            id,
            applicant.display_name.clone(),
            applicant.in_game_name.clone(),
            applicant.accepted_at.date_naive(),
            now,
        )
        .with_source(MemberSource::Application)
        .with_membership(MemberStatus::Active, false, 0);
        member.unique_game_id.clone_from(&applicant.unique_game_id);
        member.mark_resolved(applicant.platform_id, ResolutionStatus::ResolvedAuto, None, now);
        member.refresh_derived(now);
        member
    }
}

/// Staff-side roster filter. `promotion_due` is evaluated against the
/// live projection, not the cached flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterFilter {
    pub status: Option<MemberStatus>,
    pub has_clan_tag: Option<bool>,
    pub promotion_due: Option<bool>,
    pub search: Option<String>,
}

impl RosterFilter {
    pub fn matches(&self, member: &RosterMember, now: DateTime<Utc>) -> bool {
        if self.status.is_some_and(|s| s != member.status) {
            return false;
        }
        if self.has_clan_tag.is_some_and(|t| t != member.has_clan_tag) {
            return false;
        }
        if let Some(due) = self.promotion_due {
            if member.projection(now).promotion_eligible != due {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                [
                    Some(member.display_name.as_str()),
                    Some(member.in_game_name.as_str()),
                    member.unique_game_id.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }
}

/// Roster fields carried over from an accepted application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedApplicant {
    pub platform_id: Snowflake,
    pub display_name: String,
    pub in_game_name: String,
    pub unique_game_id: Option<String>,
    pub accepted_at: DateTime<Utc>,
}

/// Midnight UTC at the start of `date`
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
