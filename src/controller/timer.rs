//! PhaseTimer - one cancellable periodic ticker
//!
//! A timer is a spawned task that posts `Tick { generation }` into the
//! controller's command queue once per period. Cancelling it stops the task,
//! and the controller drops any tick whose generation is not the current
//! one, so a tick already queued by a replaced timer is discarded too.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::actor::SignalCommand;

/// Handle to a live ticker task.
#[derive(Debug)]
pub struct PhaseTimer {
    generation: u64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PhaseTimer {
    /// Arm a ticker whose first tick fires one full `period` from now.
    ///
    /// `parent` is the controller's shutdown token; cancelling it stops this
    /// timer as well.
    pub fn arm(
        generation: u64,
        period: Duration,
        tx: mpsc::Sender<SignalCommand>,
        parent: &CancellationToken,
    ) -> Self {
        let cancel = parent.child_token();
        let task_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = task_cancel.cancelled() => break,
                    _ = interval.tick() => {
                        trace!(generation, "timer fired");
                        if tx.send(SignalCommand::Tick { generation }).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            generation,
            cancel,
            handle,
        }
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Stop the ticker. Consumes the handle so a cancelled timer cannot be
    /// kept around by mistake.
    pub fn cancel(self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}
