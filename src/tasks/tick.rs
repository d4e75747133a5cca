//! Tick source background task

use std::{sync::Arc, time::Duration};

use tokio::time::{self, Instant};
use tracing::{debug, error, info};

use crate::state::AppState;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Background task driving the 1 Hz tick source.
///
/// Follows the run-state channel published by `AppState`: while the tick
/// source is active this delivers one tick per second under the epoch it was
/// activated with, and a run-state change cancels the interval before the
/// next tick can be observed. A tick already in flight when a pause or reset
/// lands carries a stale epoch and is dropped by `apply_tick`.
pub async fn tick_task(state: Arc<AppState>) {
    info!("Starting tick task");

    let mut run_rx = state.subscribe_run();

    loop {
        let run = *run_rx.borrow_and_update();
        if !run.active {
            if run_rx.changed().await.is_err() {
                debug!("Run-state channel closed, stopping tick task");
                return;
            }
            continue;
        }

        debug!("Tick source active (epoch {})", run.epoch);
        // First tick fires one full period after activation
        let mut interval = time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = state.apply_tick(run.epoch) {
                        error!("Failed to apply tick: {}", e);
                    }
                }
                changed = run_rx.changed() => {
                    if changed.is_err() {
                        debug!("Run-state channel closed, stopping tick task");
                        return;
                    }
                    // Pause, reset, or a fresh start: drop this interval and
                    // re-evaluate the run state
                    break;
                }
            }
        }
    }
}
