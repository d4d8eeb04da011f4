//! Entity to model mappers
//!
//! - `From<Model> for Entity`: convert database rows to domain objects
//! - `*Row` structs: flatten entities into column values for binding

mod application;
mod audit;
mod promotion;
mod roster_member;

pub use promotion::open_statuses_sql;
pub use roster_member::RosterMemberRow;
