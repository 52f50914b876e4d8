use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

/// Decision returned by [`LockoutPolicy::decide`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutDecision {
    pub allow_attempt: bool,
}

/// Failed-attempt lockout rule.
///
/// An account is locked once its counter reaches `threshold`. With a
/// `duration`, the lock lifts once that much time has passed since the last
/// failure; without one it lasts until the counter is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    threshold: u32,
    duration: Option<Duration>,
}

impl LockoutPolicy {
    pub const DEFAULT_THRESHOLD: u32 = 5;
    pub const DEFAULT_DURATION_SECS: i64 = 10 * 60;

    /// Create a lockout policy.
    ///
    /// A zero threshold would lock every account permanently and is raised to one.
    ///
    /// # Arguments
    /// * `threshold` - Failed attempts that trigger lockout
    /// * `duration` - Lockout window, or None for no timed expiry
    ///
    /// # Returns
    /// Configured policy
    pub fn new(threshold: u32, duration: Option<Duration>) -> Self {
        Self {
            threshold: threshold.max(1),
            duration,
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Decide whether an attempt may proceed given the current counter.
    pub fn decide(&self, failed_attempts: u32) -> LockoutDecision {
        LockoutDecision {
            allow_attempt: failed_attempts < self.threshold,
        }
    }

    /// Whether the lockout window following `last_failed_at` has passed.
    ///
    /// Always false without a configured duration, without a recorded failure
    /// time, or when the window ends beyond the representable time range.
    pub fn lockout_elapsed(
        &self,
        last_failed_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        match (self.duration, last_failed_at) {
            (Some(duration), Some(last)) => last
                .checked_add_signed(duration)
                .is_some_and(|lifted_at| now >= lifted_at),
            _ => false,
        }
    }
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_THRESHOLD,
            Some(Duration::seconds(Self::DEFAULT_DURATION_SECS)),
        )
    }
}
