//! Observer wire messages
//!
//! Outbound frames are tagged JSON objects, one per emission:
//!
//! ```text
//! {"event":"light_change","data":{"color":"green","timeLeft":10}}
//! {"event":"countdown","data":7}
//! ```

use serde::{Deserialize, Serialize};

use super::PhaseSnapshot;

/// A state-change notification broadcast to every connected observer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum SignalEvent {
    /// Phase transition (or snapshot on subscribe)
    LightChange(PhaseSnapshot),
    /// Seconds remaining in the current phase; 0 during CAUTION
    Countdown(u32),
}

/// Commands an observer may send back over its socket.
///
/// Anything that does not parse into this enum is rejected at the socket and
/// never reaches the controller.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ObserverCommand {
    ResetSignal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Phase;

    #[test]
    fn test_light_change_frame_shape() {
        let event = SignalEvent::LightChange(PhaseSnapshot {
            color: Phase::Go,
            time_left: 10,
        });
        let v = serde_json::to_value(event).unwrap();
        assert_eq!(v["event"], "light_change");
        assert_eq!(v["data"]["color"], "green");
        assert_eq!(v["data"]["timeLeft"], 10);
    }

    #[test]
    fn test_countdown_frame_shape() {
        let v = serde_json::to_value(SignalEvent::Countdown(7)).unwrap();
        assert_eq!(v["event"], "countdown");
        assert_eq!(v["data"], 7);
    }

    #[test]
    fn test_reset_command_parses() {
        let cmd: ObserverCommand = serde_json::from_str(r#"{"event":"reset_signal"}"#).unwrap();
        assert_eq!(cmd, ObserverCommand::ResetSignal);
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(serde_json::from_str::<ObserverCommand>(r#"{"event":"turn_red"}"#).is_err());
        assert!(serde_json::from_str::<ObserverCommand>("reset_signal").is_err());
    }
}
