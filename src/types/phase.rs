//! Signal phase and the snapshots derived from it

use serde::{Deserialize, Serialize};

// ============================================================================
// Phase
// ============================================================================

/// Current mode of the pedestrian signal.
///
/// On the wire the phases keep their lamp colours (`"green"`, `"yellow"`,
/// `"red"`) so existing observers and devices keep working.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
pub enum Phase {
    /// Crossing permitted, countdown running
    #[default]
    #[serde(rename = "green")]
    Go,
    /// Warning interval, no countdown; left only via presence edge or reset
    #[serde(rename = "yellow")]
    Caution,
    /// Crossing forbidden, countdown running
    #[serde(rename = "red")]
    Stop,
}

impl Phase {
    /// Lamp colour used in observer messages and status queries.
    pub const fn color(self) -> &'static str {
        match self {
            Self::Go => "green",
            Self::Caution => "yellow",
            Self::Stop => "red",
        }
    }

    /// Single-letter code served to signal hardware.
    pub const fn device_code(self) -> &'static str {
        match self {
            Self::Go => "G",
            Self::Caution => "Y",
            Self::Stop => "R",
        }
    }

    /// Whether this phase runs a countdown. CAUTION holds at zero indefinitely.
    pub const fn has_countdown(self) -> bool {
        !matches!(self, Self::Caution)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Go => write!(f, "GO"),
            Phase::Caution => write!(f, "CAUTION"),
            Phase::Stop => write!(f, "STOP"),
        }
    }
}

// ============================================================================
// Snapshots
// ============================================================================

/// Phase and countdown at one instant. This is the payload of every
/// phase-change message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhaseSnapshot {
    pub color: Phase,
    #[serde(rename = "timeLeft")]
    pub time_left: u32,
}

/// Full controller state as answered by status queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalStatus {
    pub phase: Phase,
    pub countdown: u32,
    pub person_detected: bool,
}

impl SignalStatus {
    pub const fn snapshot(&self) -> PhaseSnapshot {
        PhaseSnapshot {
            color: self.phase,
            time_left: self.countdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_wire_names() {
        assert_eq!(serde_json::to_string(&Phase::Go).unwrap(), "\"green\"");
        assert_eq!(serde_json::to_string(&Phase::Caution).unwrap(), "\"yellow\"");
        assert_eq!(serde_json::to_string(&Phase::Stop).unwrap(), "\"red\"");
    }

    #[test]
    fn test_device_codes_map_one_to_one() {
        assert_eq!(Phase::Go.device_code(), "G");
        assert_eq!(Phase::Caution.device_code(), "Y");
        assert_eq!(Phase::Stop.device_code(), "R");
    }

    #[test]
    fn test_only_caution_lacks_countdown() {
        assert!(Phase::Go.has_countdown());
        assert!(Phase::Stop.has_countdown());
        assert!(!Phase::Caution.has_countdown());
    }

    #[test]
    fn test_snapshot_serializes_time_left_camel_case() {
        let snap = PhaseSnapshot {
            color: Phase::Stop,
            time_left: 4,
        };
        let v = serde_json::to_value(snap).unwrap();
        assert_eq!(v["color"], "red");
        assert_eq!(v["timeLeft"], 4);
    }
}
