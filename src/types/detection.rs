//! Detection reports from the person-detection collaborator

use serde::{Deserialize, Serialize};

use super::PhaseSnapshot;

/// One report from the detection collaborator.
///
/// Only `detected` drives the controller; `count` is carried for display.
/// Serde enforces the shape: a missing or non-boolean `detected`, or a
/// negative `count`, fails to deserialize and is rejected at the boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetectionReport {
    pub detected: bool,
    #[serde(default)]
    pub count: u32,
}

impl DetectionReport {
    pub const fn new(detected: bool, count: u32) -> Self {
        Self { detected, count }
    }
}

/// What the controller did with a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionOutcome {
    /// State after the report was applied
    pub snapshot: PhaseSnapshot,
    /// True when the report ended CAUTION early
    pub forced_stop: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_count_defaults_to_zero() {
        let r: DetectionReport = serde_json::from_str(r#"{"detected":true}"#).unwrap();
        assert_eq!(r, DetectionReport::new(true, 0));
    }

    #[test]
    fn test_report_rejects_malformed_payloads() {
        assert!(serde_json::from_str::<DetectionReport>(r#"{"detected":"yes"}"#).is_err());
        assert!(serde_json::from_str::<DetectionReport>(r#"{"count":2}"#).is_err());
        assert!(serde_json::from_str::<DetectionReport>(r#"{"detected":true,"count":-1}"#).is_err());
    }
}
