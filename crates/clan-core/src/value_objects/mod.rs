//! Value objects - immutable types that represent domain concepts

mod rank;
mod snowflake;

pub use rank::{Rank, RankParseError};
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
