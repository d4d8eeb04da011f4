//! Axum extractors for request handling
//!
//! Custom extractors for authentication, validation, and path ids.

mod auth;
mod path;
mod validated;

pub use auth::{AuthUser, StaffUser};
pub use path::IdPath;
pub use validated::{JsonBody, ValidatedJson};
