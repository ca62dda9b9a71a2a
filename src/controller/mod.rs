//! Signal controller
//!
//! Wires the phase clock, the presence tracker, the periodic timer and the
//! observer broadcast together behind a single actor:
//!
//! ```text
//!  PhaseTimer ──Tick{gen}──┐
//!  POST /api/detect ───────┤                    ┌──▶ broadcast ──▶ observers
//!  reset (HTTP / socket) ──┼──▶ command queue ──▶ SignalActor
//!  status / subscribe ─────┘                    └──▶ oneshot replies
//! ```

mod actor;
mod handle;
mod timer;

pub use actor::{SignalActor, Subscription};
pub use handle::SignalHandle;

use std::time::Duration;

use thiserror::Error;

use crate::config::{defaults, CrosswalkConfig};

/// Failures seen by callers of [`SignalHandle`].
///
/// The controller itself never fails; these only mean it is no longer running.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ControllerError {
    #[error("signal controller is not running")]
    Stopped,
    #[error("signal controller dropped the request")]
    NoReply,
}

/// Runtime parameters for the controller.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Phase duration D, in ticks
    pub phase_duration: u32,
    /// Clock period
    pub tick_period: Duration,
    /// Events an observer may fall behind before it is resynchronised
    pub channel_capacity: usize,
    /// Command queue depth
    pub queue_capacity: usize,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            phase_duration: defaults::PHASE_DURATION_SECS,
            tick_period: Duration::from_millis(defaults::TICK_INTERVAL_MS),
            channel_capacity: defaults::BROADCAST_CHANNEL_CAPACITY,
            queue_capacity: defaults::COMMAND_QUEUE_CAPACITY,
        }
    }
}

impl From<&CrosswalkConfig> for ControllerOptions {
    fn from(config: &CrosswalkConfig) -> Self {
        Self {
            phase_duration: config.signal.phase_duration_secs,
            tick_period: Duration::from_millis(config.signal.tick_interval_ms),
            channel_capacity: config.broadcast.channel_capacity,
            queue_capacity: config.broadcast.command_queue_capacity,
        }
    }
}
