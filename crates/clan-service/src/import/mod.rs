//! Roster spreadsheet parsing: header aliases, CSV reading, cell validation

pub mod headers;
pub mod rows;

pub use headers::{field_for, normalize_header, ImportField};
pub use rows::{parse_date, parse_days, rows_from_csv, ImportRow, ValidRow};
