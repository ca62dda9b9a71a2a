//! PhaseClock - the timed phase state machine
//!
//! ```text
//!            countdown == 0, nobody present
//!   GO(D) ───────────────────────────────────▶ STOP(D)
//!     │ ▲                                        │
//!     │ └────────────── countdown == 0 ──────────┘
//!     │                                          ▲
//!     │ countdown == 0, someone present          │ presence edge (true → false)
//!     ▼                                          │
//!   CAUTION(0) ──────────────────────────────────┘
//! ```
//!
//! The clock is purely in-memory and synchronous. Every mutation returns the
//! event to broadcast; the caller decides how to deliver it, so a slow or
//! failed delivery can never undo or delay a transition that already happened.
//! The periodic timer that drives `tick` lives with the controller.

use crate::types::{Phase, PhaseSnapshot, SignalEvent};

/// Timed phase state machine. One instance per controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseClock {
    phase: Phase,
    countdown: u32,
    /// Configured phase duration D, in ticks
    duration: u32,
}

impl PhaseClock {
    /// Start in GO with a full countdown.
    pub const fn new(duration: u32) -> Self {
        Self {
            phase: Phase::Go,
            countdown: duration,
            duration,
        }
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn countdown(&self) -> u32 {
        self.countdown
    }

    pub const fn duration(&self) -> u32 {
        self.duration
    }

    pub const fn snapshot(&self) -> PhaseSnapshot {
        PhaseSnapshot {
            color: self.phase,
            time_left: self.countdown,
        }
    }

    /// Advance one clock period.
    ///
    /// `presence` is the tracker's current value and only matters at the
    /// instant GO runs out.
    pub fn tick(&mut self, presence: bool) -> SignalEvent {
        match self.phase {
            Phase::Go | Phase::Stop if self.countdown > 0 => {
                self.countdown -= 1;
                SignalEvent::Countdown(self.countdown)
            }
            Phase::Go if presence => self.enter(Phase::Caution, 0),
            Phase::Go => self.enter(Phase::Stop, self.duration),
            Phase::Stop => self.enter(Phase::Go, self.duration),
            Phase::Caution => SignalEvent::Countdown(0),
        }
    }

    /// Leave CAUTION outside the tick schedule.
    ///
    /// Returns `None` without touching state unless the clock is currently in
    /// CAUTION, so a stray call cannot disturb a running countdown.
    pub fn force_transition(&mut self, target: Phase, countdown: u32) -> Option<SignalEvent> {
        if self.phase != Phase::Caution {
            return None;
        }
        let countdown = if target.has_countdown() { countdown } else { 0 };
        Some(self.enter(target, countdown))
    }

    /// Return to GO with a full countdown from any state.
    pub fn reset(&mut self) -> SignalEvent {
        self.enter(Phase::Go, self.duration)
    }

    fn enter(&mut self, phase: Phase, countdown: u32) -> SignalEvent {
        self.phase = phase;
        self.countdown = countdown;
        SignalEvent::LightChange(self.snapshot())
    }
}
