//! # clan-service
//!
//! Application layer: roster, import, resolution, promotion queue and
//! application review services, plus the DTOs the API serializes.

pub mod dto;
pub mod import;
pub mod services;

pub use services::{ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult};
