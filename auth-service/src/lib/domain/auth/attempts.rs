use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::PoisonError;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::domain::auth::lockout::LockoutPolicy;
use crate::domain::auth::models::UserId;

#[derive(Debug, Clone, Copy)]
struct FailureRecord {
    count: u32,
    last_failed_at: DateTime<Utc>,
}

/// Failure counters for user IDs that have no account.
///
/// Lets login failures for unknown IDs follow the same counting and lockout
/// sequence as real accounts, so responses do not reveal which IDs exist.
/// Kept in memory only and bounded: entries idle for `idle_retention` are
/// forgotten by [`Self::forget_stale`] whatever the lockout policy, and once
/// `capacity` IDs are tracked a new ID evicts the least recently failed one.
pub struct UnknownAccountAttempts {
    records: Mutex<HashMap<UserId, FailureRecord>>,
    idle_retention: Duration,
    capacity: usize,
}

impl UnknownAccountAttempts {
    pub const DEFAULT_IDLE_RETENTION_SECS: i64 = 24 * 60 * 60;
    pub const DEFAULT_CAPACITY: usize = 10_000;

    pub fn new() -> Self {
        Self::with_limits(
            Duration::seconds(Self::DEFAULT_IDLE_RETENTION_SECS),
            Self::DEFAULT_CAPACITY,
        )
    }

    /// Create counters with explicit bounds.
    ///
    /// # Arguments
    /// * `idle_retention` - Time after the last failure before an entry is forgotten
    /// * `capacity` - Maximum number of tracked IDs (at least one)
    pub fn with_limits(idle_retention: Duration, capacity: usize) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            idle_retention,
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn failed_attempts(&self, user_id: &UserId) -> u32 {
        self.records()
            .get(user_id)
            .map(|record| record.count)
            .unwrap_or(0)
    }

    pub fn last_failed_at(&self, user_id: &UserId) -> Option<DateTime<Utc>> {
        self.records()
            .get(user_id)
            .map(|record| record.last_failed_at)
    }

    /// Count one more failure for `user_id`.
    ///
    /// # Returns
    /// The counter after this failure
    pub fn record_failure(&self, user_id: &UserId, now: DateTime<Utc>) -> u32 {
        let mut records = self.records();
        if records.len() >= self.capacity && !records.contains_key(user_id) {
            evict_least_recent(&mut records);
        }

        let record = records.entry(user_id.clone()).or_insert(FailureRecord {
            count: 0,
            last_failed_at: now,
        });
        record.count = record.count.saturating_add(1);
        record.last_failed_at = now;
        record.count
    }

    pub fn reset(&self, user_id: &UserId) {
        self.records().remove(user_id);
    }

    /// Forget counters whose lockout window has passed or that sat idle for
    /// longer than the retention period.
    ///
    /// # Returns
    /// Number of counters removed
    pub fn forget_stale(&self, policy: &LockoutPolicy, now: DateTime<Utc>) -> usize {
        let mut records = self.records();
        let before = records.len();
        records.retain(|_, record| {
            let idle = now.signed_duration_since(record.last_failed_at) >= self.idle_retention;
            !idle && !policy.lockout_elapsed(Some(record.last_failed_at), now)
        });
        before - records.len()
    }

    fn records(&self) -> std::sync::MutexGuard<'_, HashMap<UserId, FailureRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for UnknownAccountAttempts {
    fn default() -> Self {
        Self::new()
    }
}

fn evict_least_recent(records: &mut HashMap<UserId, FailureRecord>) {
    let oldest = records
        .iter()
        .min_by_key(|(_, record)| record.last_failed_at)
        .map(|(user_id, _)| user_id.clone());

    if let Some(user_id) = oldest {
        records.remove(&user_id);
    }
}
