//! Crosswalk Signal: presence-aware pedestrian signal controller
//!
//! A three-phase light (GO, CAUTION, STOP) driven by a periodic clock and by
//! person-detection reports, with every phase change and countdown step
//! pushed live to connected observers.
//!
//! ## Architecture
//!
//! - **Signal**: the pure phase clock and presence tracker
//! - **Controller**: single-writer actor owning the clock, the timer and the
//!   observer broadcast
//! - **API**: HTTP ingress, status queries and the observer WebSocket
//! - **Config / Logging**: TOML configuration and `tracing` setup

pub mod api;
pub mod config;
pub mod controller;
pub mod logging;
pub mod signal;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, CrosswalkConfig};

// Re-export the controller surface
pub use controller::{ControllerError, ControllerOptions, SignalActor, SignalHandle, Subscription};

// Re-export commonly used types
pub use types::{
    DetectionOutcome, DetectionReport, ObserverCommand, Phase, PhaseSnapshot, SignalEvent,
    SignalStatus,
};
