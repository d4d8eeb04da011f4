//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod applications;
pub mod guild_members;
pub mod health;
pub mod me;
pub mod promotions;
pub mod roster;
