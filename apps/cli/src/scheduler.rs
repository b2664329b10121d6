use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use youknow_app::{AppState, RunResult};

/// Runs a pipeline cycle every `interval` until `shutdown` flips to true.
///
/// The first cycle starts immediately. Cycles run on the blocking pool; a tick
/// that lands while a cycle is still going is skipped by the coordinator.
pub fn spawn(
    state: AppState,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::debug!("scheduler shutting down");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let state = state.clone();
                    let result = tokio::task::spawn_blocking(move || {
                        state.services.pipeline.run_scheduled()
                    })
                    .await;
                    match result {
                        Ok(RunResult::Skipped) => tracing::debug!("scheduled cycle skipped"),
                        Ok(result) => {
                            if let Some(error) = result.report().and_then(|report| report.error.as_ref()) {
                                tracing::warn!(kind = ?error.kind, message = %error.message, "scheduled cycle reported an error");
                            }
                        }
                        Err(err) => tracing::error!(%err, "scheduled cycle panicked"),
                    }
                }
            }
        }
    })
}
