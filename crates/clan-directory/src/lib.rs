//! # clan-directory
//!
//! Adapter between the roster service and the chat platform's REST API.
//! [`DiscordClient`] implements the [`IdentityDirectory`] and
//! [`MessagingSink`] ports from clan-core using bot credentials.
//!
//! [`IdentityDirectory`]: clan_core::IdentityDirectory
//! [`MessagingSink`]: clan_core::MessagingSink

pub mod client;
pub mod wire;

pub use client::{DirectoryClientConfig, DirectoryClientError, DiscordClient};
