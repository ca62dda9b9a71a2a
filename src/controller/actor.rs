//! Signal Actor - single owner of the clock, the presence tracker, and the timer
//!
//! Ticks, detection reports, resets, status queries and subscriptions all
//! arrive as [`SignalCommand`]s on one queue. The actor handles each command
//! to completion, without awaiting, before reading the next, so a tick and a
//! report can never interleave mid-mutation.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use super::handle::SignalHandle;
use super::timer::PhaseTimer;
use super::ControllerOptions;
use crate::signal::{PhaseClock, PresenceTracker};
use crate::types::{
    DetectionOutcome, DetectionReport, Phase, PhaseSnapshot, SignalEvent, SignalStatus,
};

// ============================================================================
// Commands
// ============================================================================

/// Commands for SignalActor
#[derive(Debug)]
pub enum SignalCommand {
    /// Clock period elapsed on the timer with this generation
    Tick { generation: u64 },
    /// Apply a detection report
    Detection {
        report: DetectionReport,
        response_tx: oneshot::Sender<DetectionOutcome>,
    },
    /// Return to GO with a full countdown and restart the timer
    Reset {
        response_tx: oneshot::Sender<PhaseSnapshot>,
    },
    /// Read the current state
    Status {
        response_tx: oneshot::Sender<SignalStatus>,
    },
    /// Register an observer: current snapshot plus a receiver for later events
    Subscribe {
        response_tx: oneshot::Sender<Subscription>,
    },
}

/// A new observer's starting point.
///
/// `snapshot` and `events` are taken in the same controller step: every
/// emission after `snapshot` is in `events`, and none before it is.
#[derive(Debug)]
pub struct Subscription {
    pub snapshot: PhaseSnapshot,
    pub events: broadcast::Receiver<SignalEvent>,
}

#[derive(Debug, Clone, Copy)]
enum TransitionCause {
    Timer,
    Presence,
    Reset,
}

impl std::fmt::Display for TransitionCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionCause::Timer => write!(f, "timer"),
            TransitionCause::Presence => write!(f, "presence"),
            TransitionCause::Reset => write!(f, "reset"),
        }
    }
}

// ============================================================================
// Signal Actor
// ============================================================================

/// Signal Actor - serializes every mutation of the signal state
pub struct SignalActor {
    clock: PhaseClock,
    presence: PresenceTracker,
    /// The one live ticker, if armed
    timer: Option<PhaseTimer>,
    next_generation: u64,
    tick_period: Duration,
    events_tx: broadcast::Sender<SignalEvent>,
    /// Cloned into each timer so ticks share the command queue
    tx: mpsc::Sender<SignalCommand>,
    rx: mpsc::Receiver<SignalCommand>,
    cancel: CancellationToken,
}

impl SignalActor {
    /// Create new signal actor and handle
    pub fn new(options: &ControllerOptions, cancel: CancellationToken) -> (Self, SignalHandle) {
        let (tx, rx) = mpsc::channel(options.queue_capacity);
        let (events_tx, _) = broadcast::channel(options.channel_capacity);

        let actor = Self {
            clock: PhaseClock::new(options.phase_duration),
            presence: PresenceTracker::new(),
            timer: None,
            next_generation: 0,
            tick_period: options.tick_period,
            events_tx,
            tx: tx.clone(),
            rx,
            cancel,
        };

        (actor, SignalHandle::new(tx))
    }

    /// Run the actor loop until the cancellation token fires
    pub async fn run(mut self) {
        info!(
            phase = %self.clock.phase(),
            time_left = self.clock.countdown(),
            tick_ms = u64::try_from(self.tick_period.as_millis()).unwrap_or(u64::MAX),
            "SignalActor starting"
        );
        self.arm_timer();

        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                cmd = self.rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
            }
        }

        self.cancel_timer();
        info!("SignalActor stopped");
    }

    fn handle_command(&mut self, cmd: SignalCommand) {
        match cmd {
            SignalCommand::Tick { generation } => self.handle_tick(generation),
            SignalCommand::Detection {
                report,
                response_tx,
            } => {
                let outcome = self.handle_detection(report);
                let _ = response_tx.send(outcome);
            }
            SignalCommand::Reset { response_tx } => {
                let snapshot = self.handle_reset();
                let _ = response_tx.send(snapshot);
            }
            SignalCommand::Status { response_tx } => {
                let _ = response_tx.send(self.status());
            }
            SignalCommand::Subscribe { response_tx } => {
                let subscription = Subscription {
                    snapshot: self.clock.snapshot(),
                    events: self.events_tx.subscribe(),
                };
                let _ = response_tx.send(subscription);
            }
        }
    }

    fn handle_tick(&mut self, generation: u64) {
        if self.timer.as_ref().map(PhaseTimer::generation) != Some(generation) {
            debug!(generation, current = self.next_generation, "Discarding tick from replaced timer");
            return;
        }
        let from = self.clock.phase();
        let event = self.clock.tick(self.presence.query());
        self.publish(from, TransitionCause::Timer, event);
    }

    fn handle_detection(&mut self, report: DetectionReport) -> DetectionOutcome {
        let edge = self.presence.update(report.detected);
        trace!(
            detected = report.detected,
            previously = self.presence.previously_detected(),
            count = report.count,
            edge,
            "Detection report applied"
        );

        let mut forced_stop = false;
        if edge && self.clock.phase() == Phase::Caution {
            self.cancel_timer();
            let duration = self.clock.duration();
            if let Some(event) = self.clock.force_transition(Phase::Stop, duration) {
                self.publish(Phase::Caution, TransitionCause::Presence, event);
                forced_stop = true;
            }
            self.arm_timer();
        }

        DetectionOutcome {
            snapshot: self.clock.snapshot(),
            forced_stop,
        }
    }

    fn handle_reset(&mut self) -> PhaseSnapshot {
        self.cancel_timer();
        let from = self.clock.phase();
        let event = self.clock.reset();
        self.publish(from, TransitionCause::Reset, event);
        self.arm_timer();
        self.clock.snapshot()
    }

    const fn status(&self) -> SignalStatus {
        SignalStatus {
            phase: self.clock.phase(),
            countdown: self.clock.countdown(),
            person_detected: self.presence.query(),
        }
    }

    /// Log and broadcast an event whose state change is already committed.
    fn publish(&self, from: Phase, cause: TransitionCause, event: SignalEvent) {
        match event {
            SignalEvent::LightChange(snapshot) => info!(
                from = %from,
                to = %snapshot.color,
                time_left = snapshot.time_left,
                cause = %cause,
                "Signal phase changed"
            ),
            SignalEvent::Countdown(time_left) => {
                debug!(phase = %from, time_left, "Countdown");
            }
        }

        // A send only fails when nobody is listening.
        match self.events_tx.send(event) {
            Ok(receivers) => trace!(receivers, "Event broadcast"),
            Err(_) => trace!("Event dropped, no observers"),
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            trace!(generation = timer.generation(), "Timer cancelled");
            timer.cancel();
        }
    }

    /// Arm a fresh timer. The previous one must already be cancelled.
    fn arm_timer(&mut self) {
        debug_assert!(self.timer.is_none(), "two timers alive");
        self.next_generation += 1;
        self.timer = Some(PhaseTimer::arm(
            self.next_generation,
            self.tick_period,
            self.tx.clone(),
            &self.cancel,
        ));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn options(duration: u32) -> ControllerOptions {
        ControllerOptions {
            phase_duration: duration,
            ..ControllerOptions::default()
        }
    }

    /// Build an actor driven by hand: commands are fed straight into
    /// `handle_command` and the timer generation is read back from the actor.
    fn manual_actor(duration: u32) -> (SignalActor, broadcast::Receiver<SignalEvent>) {
        let (mut actor, _handle) = SignalActor::new(&options(duration), CancellationToken::new());
        actor.arm_timer();
        let rx = actor.events_tx.subscribe();
        (actor, rx)
    }

    fn tick(actor: &mut SignalActor) {
        let generation = actor.next_generation;
        actor.handle_command(SignalCommand::Tick { generation });
    }

    fn detect(actor: &mut SignalActor, detected: bool) -> DetectionOutcome {
        actor.handle_detection(DetectionReport::new(detected, u32::from(detected)))
    }

    #[tokio::test]
    async fn test_tick_emits_countdown() {
        let (mut actor, mut rx) = manual_actor(10);
        tick(&mut actor);
        assert_eq!(rx.try_recv().unwrap(), SignalEvent::Countdown(9));
        assert_eq!(actor.status().countdown, 9);
    }

    #[tokio::test]
    async fn test_stale_tick_is_discarded() {
        let (mut actor, mut rx) = manual_actor(10);
        let stale = actor.next_generation;
        actor.handle_reset();
        let _ = rx.try_recv();

        actor.handle_command(SignalCommand::Tick { generation: stale });
        assert!(rx.try_recv().is_err());
        assert_eq!(actor.status().countdown, 10);

        tick(&mut actor);
        assert_eq!(actor.status().countdown, 9);
    }

    #[tokio::test]
    async fn test_presence_edge_forces_caution_to_stop() {
        let (mut actor, mut rx) = manual_actor(2);
        detect(&mut actor, true);
        for _ in 0..3 {
            tick(&mut actor);
        }
        assert_eq!(actor.status().phase, Phase::Caution);
        while rx.try_recv().is_ok() {}

        let generation_before = actor.next_generation;
        let outcome = detect(&mut actor, false);
        assert!(outcome.forced_stop);
        assert_eq!(
            outcome.snapshot,
            PhaseSnapshot {
                color: Phase::Stop,
                time_left: 2
            }
        );
        assert_eq!(rx.try_recv().unwrap(), SignalEvent::LightChange(outcome.snapshot));
        assert_eq!(actor.next_generation, generation_before + 1);
    }

    #[tokio::test]
    async fn test_presence_edge_outside_caution_changes_nothing() {
        let (mut actor, mut rx) = manual_actor(10);
        detect(&mut actor, true);
        let outcome = detect(&mut actor, false);
        assert!(!outcome.forced_stop);
        assert_eq!(outcome.snapshot.color, Phase::Go);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_repeated_reports_are_idempotent() {
        let (mut actor, mut rx) = manual_actor(1);
        detect(&mut actor, true);
        tick(&mut actor);
        tick(&mut actor);
        assert_eq!(actor.status().phase, Phase::Caution);
        while rx.try_recv().is_ok() {}

        for _ in 0..5 {
            let outcome = detect(&mut actor, true);
            assert!(!outcome.forced_stop);
        }
        assert_eq!(actor.status().phase, Phase::Caution);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_reset_keeps_presence_state() {
        let (mut actor, _rx) = manual_actor(10);
        detect(&mut actor, true);
        actor.handle_reset();
        assert!(actor.status().person_detected);
        assert!(actor.presence.query());
    }

    #[tokio::test]
    async fn test_reset_replaces_timer() {
        let (mut actor, _rx) = manual_actor(10);
        let first = actor.next_generation;
        actor.handle_reset();
        let timer = actor.timer.as_ref().map(PhaseTimer::generation);
        assert_eq!(timer, Some(first + 1));
    }

    #[tokio::test]
    async fn test_subscribe_snapshot_matches_state() {
        let (mut actor, _rx) = manual_actor(10);
        tick(&mut actor);
        tick(&mut actor);

        let (tx, mut reply) = oneshot::channel();
        actor.handle_command(SignalCommand::Subscribe { response_tx: tx });
        let mut sub = reply.try_recv().unwrap();
        assert_eq!(
            sub.snapshot,
            PhaseSnapshot {
                color: Phase::Go,
                time_left: 8
            }
        );

        // Nothing emitted before the subscription leaks into it.
        assert!(sub.events.try_recv().is_err());
        tick(&mut actor);
        assert_eq!(sub.events.try_recv().unwrap(), SignalEvent::Countdown(7));
    }
}
