//! PresenceTracker - latest detection result and the falling-edge rule

/// Holds the latest and previous presence reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresenceTracker {
    currently_detected: bool,
    previously_detected: bool,
}

impl PresenceTracker {
    pub const fn new() -> Self {
        Self {
            currently_detected: false,
            previously_detected: false,
        }
    }

    /// Record a report and return whether it produced a presence edge
    /// (previously present, now absent).
    ///
    /// Both fields move together, and the edge is evaluated exactly once per
    /// report. Repeating the same report never produces a second edge.
    pub fn update(&mut self, detected: bool) -> bool {
        self.previously_detected = self.currently_detected;
        self.currently_detected = detected;
        self.previously_detected && !self.currently_detected
    }

    pub const fn query(&self) -> bool {
        self.currently_detected
    }

    pub const fn previously_detected(&self) -> bool {
        self.previously_detected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initially_absent() {
        let tracker = PresenceTracker::new();
        assert!(!tracker.query());
        assert!(!tracker.previously_detected());
    }

    #[test]
    fn test_edge_only_on_true_then_false() {
        let mut tracker = PresenceTracker::new();
        assert!(!tracker.update(false));
        assert!(!tracker.update(true));
        assert!(!tracker.update(true));
        assert!(tracker.update(false));
        assert!(!tracker.update(false));
    }

    #[test]
    fn test_update_shifts_previous() {
        let mut tracker = PresenceTracker::new();
        tracker.update(true);
        assert!(tracker.query());
        assert!(!tracker.previously_detected());
        tracker.update(false);
        assert!(!tracker.query());
        assert!(tracker.previously_detected());
    }
}
