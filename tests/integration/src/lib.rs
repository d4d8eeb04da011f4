//! Integration test utilities for the clan roster API
//!
//! Each [`TestServer`] runs the real router against PostgreSQL, with a
//! [`MockPlatform`] standing in for the chat platform's REST API.

pub mod fixtures;
pub mod helpers;
pub mod mock_platform;

pub use fixtures::*;
pub use helpers::*;
pub use mock_platform::MockPlatform;
