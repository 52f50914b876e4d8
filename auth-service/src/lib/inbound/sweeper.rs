use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval_at;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;

use crate::domain::auth::ports::AuthServicePort;

/// Spawn the periodic maintenance task.
///
/// Every `period` the service purges expired sessions, forgets elapsed
/// counters for unknown user IDs and prunes idle account locks. Failures are
/// logged and retried on the next tick.
///
/// # Arguments
/// * `service` - Auth service to sweep
/// * `period` - Time between sweeps (first sweep after one period)
///
/// # Returns
/// Handle of the spawned task; abort it to stop sweeping
pub fn spawn_sweeper(service: Arc<dyn AuthServicePort>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match service.sweep().await {
                Ok(report) => tracing::debug!(
                    expired_sessions = report.expired_sessions,
                    forgotten_attempts = report.forgotten_attempts,
                    released_locks = report.released_locks,
                    "Sweep completed"
                ),
                Err(e) => tracing::warn!(error = %e, "Sweep failed"),
            }
        }
    })
}
