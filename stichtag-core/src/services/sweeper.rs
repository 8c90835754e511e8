//! Deadline sweeper.
//!
//! The DeadlineSweeper is responsible for:
//! - Finding events whose deadline is due and not yet processed
//! - Running the allocation draw for each due event
//! - Marking each event processed exactly once, after its draw completed
//! - Isolating failures per event: a failed event keeps its flag unset and
//!   is retried by the next sweep, the others continue
//!
//! Sweeps serialize on an internal lock, so the periodic loop and the manual
//! trigger can never interleave passes.

use super::{AllocationEngine, AllocationOutcome};
use crate::config::SweepConfig;
use crate::notify::NotificationSender;
use crate::store::{Store, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock, watch};
use tracing::{error, info};

/// Counters from one sweep pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Due events fully processed and marked.
    pub events_processed: u32,
    /// Due events that failed and stay due for the next pass.
    pub events_failed: u32,
    /// Seats filled across all processed events.
    pub seats_filled: u32,
    /// Notifications accepted by the mail service.
    pub notifications_sent: u32,
    /// Notifications that failed to deliver.
    pub notifications_failed: u32,
}

impl SweepReport {
    fn absorb(&mut self, outcome: AllocationOutcome) {
        self.events_processed += 1;
        self.seats_filled += outcome.seats_filled;
        self.notifications_sent += outcome.notifications_sent;
        self.notifications_failed += outcome.notifications_failed;
    }
}

/// Runs the deadline draw over all due events.
pub struct DeadlineSweeper {
    store: Arc<dyn Store>,
    engine: AllocationEngine,
    pass_lock: Mutex<()>,
}

impl DeadlineSweeper {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn NotificationSender>) -> Self {
        Self {
            engine: AllocationEngine::new(store.clone(), notifier),
            store,
            pass_lock: Mutex::new(()),
        }
    }

    /// Runs one sweep for the given date.
    ///
    /// Failing to read the due list is fatal for the pass. Everything after
    /// that is isolated per event. A second sweep for the same date finds
    /// the processed events no longer due and adds nothing.
    pub async fn run_sweep(&self, today: time::Date) -> Result<SweepReport, StoreError> {
        let _guard = self.pass_lock.lock().await;

        let due = self.store.due_events(today).await?;
        info!(date = %today, due = due.len(), "deadline sweep started");

        let mut report = SweepReport::default();
        for event in due {
            match self.engine.allocate(&event).await {
                Ok(outcome) => {
                    if let Err(e) = self.store.mark_deadline_notified(event.event_id).await {
                        error!(
                            event_id = %event.event_id,
                            error = %e,
                            "failed to mark event processed"
                        );
                        report.events_failed += 1;
                        continue;
                    }
                    report.absorb(outcome);
                }
                Err(e) => {
                    error!(event_id = %event.event_id, error = %e, "deadline draw failed");
                    report.events_failed += 1;
                }
            }
        }

        info!(
            processed = report.events_processed,
            failed = report.events_failed,
            seats_filled = report.seats_filled,
            "deadline sweep finished"
        );
        Ok(report)
    }

    /// Periodic sweep loop.
    ///
    /// Reads the interval from the shared config on every turn, so a reload
    /// takes effect without restarting. An interval of zero idles the loop.
    pub async fn run(
        self: Arc<Self>,
        sweep: Arc<RwLock<SweepConfig>>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        info!("DeadlineSweeper started");

        loop {
            let interval = sweep.read().await.interval_secs;
            let wait = if interval == 0 {
                // Idle until a reload brings the interval back.
                Duration::from_secs(60)
            } else {
                Duration::from_secs(interval)
            };

            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("DeadlineSweeper received shutdown signal");
                        break;
                    }
                }

                _ = tokio::time::sleep(wait) => {
                    if interval == 0 {
                        continue;
                    }
                    let today = time::OffsetDateTime::now_utc().date();
                    if let Err(e) = self.run_sweep(today).await {
                        error!(error = %e, "scheduled deadline sweep failed");
                    }
                }
            }
        }

        info!("DeadlineSweeper shutdown complete");
    }
}
