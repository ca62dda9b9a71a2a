//! Shared data structures for the pedestrian signal controller
//!
//! - `Phase`, `PhaseSnapshot`, `SignalStatus`: signal state as seen from outside
//! - `SignalEvent`, `ObserverCommand`: observer wire messages
//! - `DetectionReport`, `DetectionOutcome`: presence ingress

mod phase;
mod events;
mod detection;

pub use phase::*;
pub use events::*;
pub use detection::*;
