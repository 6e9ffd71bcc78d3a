//! Phase timer background task

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    time::{interval_at, sleep, Instant, MissedTickBehavior},
};
use tracing::{debug, error, info};

use crate::state::{AppState, Phase, TimerSnapshot};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Background task that delivers ticks and completes advances for the active session
pub async fn phase_timer_task(state: Arc<AppState>) {
    info!("Starting phase timer task");

    let mut snapshot_rx = state.timer_update_tx.subscribe();

    loop {
        let snapshot = snapshot_rx.borrow_and_update().clone();

        match snapshot.phase {
            Phase::Running if snapshot.ticking => {
                if !run_tick_source(&state, &mut snapshot_rx, snapshot.tick_generation).await {
                    break;
                }
            }
            Phase::Advancing => {
                let delay = state.timer_options.advance_delay;
                tokio::select! {
                    _ = sleep(delay) => {
                        debug!("Advance delay of {:?} elapsed", delay);
                        if let Err(e) = state.complete_advance() {
                            error!("Failed to start next activity: {}", e);
                        }
                    }
                    // Any change restarts the wait from the new snapshot
                    changed = snapshot_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
            _ => {
                if snapshot_rx.changed().await.is_err() {
                    break;
                }
            }
        }
    }

    info!("Phase timer task stopped");
}

/// Tick once per second until the given tick source is cancelled.
/// Returns false when the snapshot channel closed.
async fn run_tick_source(
    state: &AppState,
    snapshot_rx: &mut watch::Receiver<TimerSnapshot>,
    generation: u64,
) -> bool {
    debug!("Tick source {} armed", generation);

    let mut interval = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = state.tick(generation) {
                    error!("Failed to deliver tick: {}", e);
                }
            }
            changed = snapshot_rx.changed() => {
                if changed.is_err() {
                    return false;
                }
                let current = snapshot_rx.borrow().clone();
                if current.phase != Phase::Running || !current.ticking || current.tick_generation != generation {
                    debug!("Tick source {} cancelled", generation);
                    return true;
                }
            }
        }
    }
}
