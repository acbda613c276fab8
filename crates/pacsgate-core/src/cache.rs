//! Time-based single-value cache cell.
//!
//! Both process-wide caches in the gateway (the bearer credential and the
//! institution directory) are a single payload that expires on a deadline
//! and is rebuilt lazily by whichever caller observes the expiry. A
//! [`TtlCell`] holds that payload together with its expiry instant behind
//! a [`tokio::sync::RwLock`].
//!
//! There is deliberately no mutual exclusion around the check-then-refresh
//! sequence: concurrent callers racing past an expired entry may each
//! rebuild and store. Refreshes are idempotent for both payloads, so the
//! race costs duplicated work, not correctness.

use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Cached payload plus its expiry instant.
struct CacheEntry<T> {
    value: T,
    expires_at: Instant,
}

/// A single-entry cache invalidated purely by monotonic time comparison.
pub struct TtlCell<T> {
    slot: RwLock<Option<CacheEntry<T>>>,
}

impl<T: Clone> TtlCell<T> {
    /// Creates an empty cell.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Returns the cached value if present and not yet expired.
    ///
    /// An expired entry is treated exactly like an empty cell; it is left
    /// in place and overwritten by the next [`put`](Self::put).
    pub async fn get(&self) -> Option<T> {
        let slot = self.slot.read().await;
        match slot.as_ref() {
            Some(entry) if Instant::now() < entry.expires_at => Some(entry.value.clone()),
            _ => None,
        }
    }

    /// Stores a value valid for `ttl` from now.
    pub async fn put(&self, value: T, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        let mut slot = self.slot.write().await;
        *slot = Some(entry);
    }

    /// Drops the cached value, if any.
    pub async fn clear(&self) {
        let mut slot = self.slot.write().await;
        *slot = None;
    }
}

impl<T: Clone> Default for TtlCell<T> {
    fn default() -> Self {
        Self::new()
    }
}
