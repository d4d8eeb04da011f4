//! REST client for the chat platform

mod discord;

pub use discord::{DirectoryClientConfig, DirectoryClientError, DiscordClient};
