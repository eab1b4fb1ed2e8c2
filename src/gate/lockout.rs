//! Client-side cooldown for admin login attempts.
//!
//! Flow Overview:
//! 1) Count consecutive rejected admin attempts in the client store.
//! 2) Once the count reaches 3, lock admin mode for 15 minutes.
//! 3) Expiry is evaluated lazily on every check; the count itself is only
//!    cleared by a successful login.
//!
//! Anything with access to the store (or the API directly) bypasses this. It
//! keeps honest users from hammering a wrong password, nothing more.

use super::{
    clock::Clock,
    store::{ClientStore, StoreError, KEY_ADMIN_FAILURES, KEY_ADMIN_LOCKED_UNTIL},
};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, warn};

pub const FAILURE_LIMIT: u32 = 3;
pub const COOLDOWN_DURATION: Duration = Duration::from_secs(15 * 60);

/// Result of a lock check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockStatus {
    pub locked: bool,
    pub remaining: Duration,
}

impl LockStatus {
    pub const UNLOCKED: Self = Self {
        locked: false,
        remaining: Duration::ZERO,
    };

    #[must_use]
    pub fn remaining_ms(&self) -> u64 {
        u64::try_from(self.remaining.as_millis()).unwrap_or(u64::MAX)
    }
}

#[derive(Debug)]
pub struct LockoutGuard<'a, S, C> {
    store: &'a S,
    clock: &'a C,
}

impl<'a, S: ClientStore, C: Clock> LockoutGuard<'a, S, C> {
    #[must_use]
    pub const fn new(store: &'a S, clock: &'a C) -> Self {
        Self { store, clock }
    }

    /// Consecutive failures recorded since the last reset.
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.store
            .get(KEY_ADMIN_FAILURES)
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0)
    }

    #[must_use]
    pub fn locked_until(&self) -> Option<DateTime<Utc>> {
        let raw = self.store.get(KEY_ADMIN_LOCKED_UNTIL)?;
        let millis = raw.trim().parse::<i64>().ok().or_else(|| {
            warn!("ignoring malformed admin lock expiry");
            None
        })?;
        DateTime::from_timestamp_millis(millis)
    }

    /// Reports whether admin mode is locked right now. Expired locks read as unlocked.
    #[must_use]
    pub fn check_lock(&self) -> LockStatus {
        let Some(until) = self.locked_until() else {
            return LockStatus::UNLOCKED;
        };

        let now = self.clock.now();
        if now >= until {
            return LockStatus::UNLOCKED;
        }

        LockStatus {
            locked: true,
            remaining: (until - now).to_std().unwrap_or_default(),
        }
    }

    /// Counts one rejected admin attempt, locking once the limit is reached.
    ///
    /// # Errors
    /// Returns an error if the updated state cannot be persisted.
    pub fn record_failure(&self) -> Result<LockStatus, StoreError> {
        let failures = self.failure_count().saturating_add(1);
        self.store
            .set(KEY_ADMIN_FAILURES, &failures.to_string())?;

        if failures >= FAILURE_LIMIT {
            let cooldown = chrono::Duration::from_std(COOLDOWN_DURATION).unwrap_or_default();
            let until = self.clock.now() + cooldown;
            self.store
                .set(KEY_ADMIN_LOCKED_UNTIL, &until.timestamp_millis().to_string())?;
            warn!(failures, "admin login locked until {until}");
        } else {
            debug!(failures, "admin login failure recorded");
        }

        Ok(self.check_lock())
    }

    /// Clears the failure count and any lock.
    ///
    /// # Errors
    /// Returns an error if the state cannot be cleared.
    pub fn reset(&self) -> Result<(), StoreError> {
        self.store.remove(KEY_ADMIN_FAILURES)?;
        self.store.remove(KEY_ADMIN_LOCKED_UNTIL)
    }
}
