//! Test fixtures and response shapes
//!
//! Ids are unique per process and per run, so tests can share one
//! database without truncating it.

use std::sync::atomic::{AtomicI64, AtomicU16, Ordering};
use std::sync::OnceLock;

use serde::Deserialize;
use serde_json::{json, Value};

pub const GUILD_ID: i64 = 4_200_000_000;
pub const STAFF_ROLE: i64 = 9_001;
pub const MEMBER_ROLE: i64 = 9_002;
pub const APPLICANT_ROLE: i64 = 9_003;
pub const PROMOTION_CHANNEL: i64 = 8_001;
pub const APP_LOG_CHANNEL: i64 = 8_002;

static COUNTER: AtomicI64 = AtomicI64::new(0);
static WORKER: AtomicU16 = AtomicU16::new(0);

/// A platform or game id no earlier run has used
pub fn unique_id() -> i64 {
    static BASE: OnceLock<i64> = OnceLock::new();
    let base = *BASE.get_or_init(|| chrono::Utc::now().timestamp_micros());
    base + COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Row id generators must not share a worker id within one process
pub fn next_worker_id() -> u16 {
    let pid = (std::process::id() % 512) as u16;
    (pid + WORKER.fetch_add(1, Ordering::SeqCst)) % 1024
}

/// `YYYY-MM-DD` for a date `days` ago
pub fn days_ago(days: i64) -> String {
    (chrono::Utc::now() - chrono::Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

/// Body for `POST /admin/roster`
pub fn new_member(name: &str, discord_id: Option<i64>, join_days_ago: i64, tagged: bool) -> Value {
    json!({
        "discord_name": name,
        "discord_id": discord_id.map(|id| id.to_string()),
        "ign": format!("{name}-ign"),
        "uid": format!("UID{}", unique_id()),
        "join_date": days_ago(join_days_ago),
        "status": "active",
        "has_420_tag": tagged,
    })
}

/// Body for `POST /applications`
pub fn application_form(uid: &str) -> Value {
    json!({
        "ign": "  Ace  ",
        "uid": uid,
        "timezone": "UTC",
        "why_join": "squads",
    })
}

#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct MeResponse {
    pub discord_id: String,
    pub in_guild: bool,
    pub is_staff: bool,
    pub is_member: bool,
    pub application: Option<ApplicationSummary>,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationSummary {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationResponse {
    pub id: String,
    pub discord_id: String,
    pub display_name: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationListResponse {
    pub applications: Vec<ApplicationResponse>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewResponse {
    pub ok: bool,
    pub status: String,
    pub role_assigned: Option<bool>,
    pub role_removed: Option<bool>,
    pub clan_member_upsert_ok: Option<bool>,
    pub clan_member_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RosterMember {
    pub id: String,
    pub discord_id: Option<String>,
    pub discord_name: String,
    pub uid: Option<String>,
    pub status: String,
    pub has_420_tag: bool,
    pub time_in_clan_days: i64,
    pub rank_current: String,
    pub rank_next: Option<String>,
    pub promote_eligible: bool,
    pub needs_resolution: bool,
    pub resolution_status: String,
    pub resolved_by: Option<String>,
    pub source: String,
}

#[derive(Debug, Deserialize)]
pub struct RosterEnvelope {
    pub ok: bool,
    pub member: RosterMember,
}

#[derive(Debug, Deserialize)]
pub struct RosterPage {
    pub members: Vec<RosterMember>,
    pub total: usize,
    pub promotion_due_count: usize,
    pub unresolved_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct ImportResponse {
    pub ok: bool,
    pub imported: usize,
    pub updated: usize,
    pub unresolved: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub label: String,
    pub sublabel: String,
    pub resolve_token: String,
}

#[derive(Debug, Deserialize)]
pub struct CandidateList {
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct PromotionItem {
    pub id: String,
    pub clan_member_id: String,
    pub from_rank: String,
    pub to_rank: String,
    pub status: String,
    pub last_error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PromotionQueue {
    pub items: Vec<PromotionItem>,
    pub confirm_threshold: usize,
}

#[derive(Debug, Deserialize)]
pub struct BuildResponse {
    pub queued_added_count: usize,
    pub total_queued_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmResponse {
    pub confirmed_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct ProcessResponse {
    pub processed_count: usize,
    pub failed_count: usize,
    pub announcement_posted: bool,
}

#[derive(Debug, Deserialize)]
pub struct QueueItemEnvelope {
    pub ok: bool,
    pub item: PromotionItem,
}
