//! Raw import rows and per-row validation

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use clan_core::{MemberStatus, Rank};
use csv::{ReaderBuilder, Trim};
use serde_json::{Map, Value};

use super::headers::{field_for, ImportField};

/// Date layouts seen in roster sheets, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%b %d %Y", "%b %d, %Y", "%B %d, %Y"];

/// One spreadsheet row with headers mapped to canonical fields.
/// Blank cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRow {
    pub discord_name: Option<String>,
    pub in_game_name: Option<String>,
    pub uid: Option<String>,
    pub join_date: Option<String>,
    pub time_in_clan: Option<String>,
    pub rank: Option<String>,
    pub status: Option<String>,
}

/// A row that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRow {
    pub discord_name: String,
    pub in_game_name: String,
    pub uid: String,
    pub join_date: NaiveDate,
    pub status: MemberStatus,
    /// Rank declared in the sheet, entry rank when blank or unknown
    pub declared_rank: Rank,
    /// Days carried over from the sheet for members not accruing tenure
    pub carried_days: i64,
}

impl ImportRow {
    fn set(&mut self, field: ImportField, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        let slot = match field {
            ImportField::DiscordName => &mut self.discord_name,
            ImportField::InGameName => &mut self.in_game_name,
            ImportField::Uid => &mut self.uid,
            ImportField::JoinDate => &mut self.join_date,
            ImportField::TimeInClan => &mut self.time_in_clan,
            ImportField::Rank => &mut self.rank,
            ImportField::Status => &mut self.status,
            ImportField::Ignored => return,
        };
        *slot = Some(value.to_string());
    }

    /// Build a row from a JSON object of header to cell value
    pub fn from_json(object: &Map<String, Value>) -> Self {
        let mut row = Self::default();
        for (header, value) in object {
            let Some(field) = field_for(header) else {
                continue;
            };
            match value {
                Value::Null => {}
                Value::String(s) => row.set(field, s),
                other => row.set(field, &other.to_string()),
            }
        }
        row
    }

    /// Check required cells. `row_number` is 1-based and only used in the
    /// error message.
    pub fn validate(&self, row_number: usize) -> Result<ValidRow, String> {
        let discord_name = self
            .discord_name
            .clone()
            .ok_or_else(|| format!("Row {row_number}: missing Discord name"))?;
        let in_game_name = self
            .in_game_name
            .clone()
            .ok_or_else(|| format!("Row {row_number}: missing Ingame name"))?;
        let uid = self
            .uid
            .clone()
            .ok_or_else(|| format!("Row {row_number}: missing UID"))?;
        let join_date = self
            .join_date
            .as_deref()
            .and_then(parse_date)
            .ok_or_else(|| format!("Row {row_number}: invalid or missing Join date"))?;

        Ok(ValidRow {
            discord_name,
            in_game_name,
            uid,
            join_date,
            status: self
                .status
                .as_deref()
                .map_or(MemberStatus::Active, MemberStatus::from_cell),
            declared_rank: self
                .rank
                .as_deref()
                .map_or(Rank::ENTRY, Rank::from_name_or_entry),
            carried_days: self.time_in_clan.as_deref().map_or(0, parse_days),
        })
    }
}

/// Parse CSV text with a header row into import rows.
///
/// Ragged rows are accepted; missing trailing cells read as blank.
pub fn rows_from_csv(text: &str) -> Result<Vec<ImportRow>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let fields: Vec<Option<ImportField>> = reader.headers()?.iter().map(field_for).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = ImportRow::default();
        for (field, value) in fields.iter().zip(record.iter()) {
            if let Some(field) = field {
                row.set(*field, value);
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Lenient date parse over the formats roster sheets use
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Leading integer of a cell ("45", "45 days"), 0 when there is none
pub fn parse_days(raw: &str) -> i64 {
    let raw = raw.trim();
    let end = raw
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && c == '-')))
        .map_or(raw.len(), |(i, _)| i);
    raw[..end].parse().unwrap_or(0)
}
