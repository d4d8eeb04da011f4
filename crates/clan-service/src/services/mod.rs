//! Business logic services
//!
//! Each service borrows the [`ServiceContext`] for the length of one request
//! and orchestrates domain operations over the store and platform ports.

pub mod application;
pub mod auth;
pub mod context;
pub mod directory;
pub mod error;
pub mod import;
pub mod promotion;
pub mod resolve;
pub mod roster;

pub use application::ApplicationService;
pub use auth::{AuthService, Caller};
pub use context::{ServiceContext, ServiceContextBuilder, ServiceSettings};
pub use directory::DirectoryService;
pub use error::{ServiceError, ServiceResult};
pub use import::ImportService;
pub use promotion::PromotionService;
pub use resolve::ResolveService;
pub use roster::RosterService;
