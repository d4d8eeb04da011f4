//! In-process cooldown store.
//!
//! Windows live in this process only and are lost on restart. Closed
//! windows are dropped on the next acquire, so the map holds open windows
//! only.

use async_trait::async_trait;
use clan_core::{CooldownStore, DomainError};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct MemoryCooldownStore {
    /// Key -> instant its window closes
    windows: DashMap<String, Instant>,
}

impl MemoryCooldownStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open windows currently tracked
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    // Must not run while an entry guard is held: retain locks every shard
    fn purge_closed(&self, now: Instant) {
        self.windows.retain(|_, closes_at| *closes_at > now);
    }
}

#[async_trait]
impl CooldownStore for MemoryCooldownStore {
    async fn acquire(&self, key: &str, window_secs: u64) -> Result<(), DomainError> {
        let now = Instant::now();
        self.purge_closed(now);

        match self.windows.entry(key.to_string()) {
            Entry::Occupied(entry) => {
                let remaining = entry.get().saturating_duration_since(now);
                // round up so callers never retry a hair too early
                let retry_after_secs =
                    remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
                Err(DomainError::RateLimited {
                    retry_after_secs: retry_after_secs.max(1),
                })
            }
            Entry::Vacant(entry) => {
                if window_secs > 0 {
                    entry.insert(now + Duration::from_secs(window_secs));
                }
                Ok(())
            }
        }
    }
}
