use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::state::AppState;

/// Evicts stale lockout records and expired sessions every `every`.
pub fn spawn_sweeper(state: Arc<AppState>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            run_sweep(&state).await;
        }
    })
}

async fn run_sweep(state: &AppState) -> (usize, usize) {
    let now = Instant::now();
    let attempts = state.login_tracker.sweep(now);
    let sessions = state.sessions.lock().await.cleanup_expired(now);
    if attempts > 0 || sessions > 0 {
        tracing::debug!(
            attempts,
            sessions,
            tracked = state.login_tracker.tracked_keys(),
            "Sweep evicted stale entries"
        );
    }
    (attempts, sessions)
}
