//! API route handlers
//!
//! - Detection ingress, reset, status and device queries
//! - Health
//! - Observer WebSocket

mod signal;
mod socket;

pub use signal::*;
pub use socket::*;

use std::time::Instant;

use crate::api::observers::ObserverRegistry;
use crate::controller::SignalHandle;

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Debug, Clone)]
pub struct ApiState {
    /// Front door to the signal controller
    pub signal: SignalHandle,
    /// Connected observer sockets
    pub observers: ObserverRegistry,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl ApiState {
    pub fn new(signal: SignalHandle) -> Self {
        Self {
            signal,
            observers: ObserverRegistry::new(),
            started_at: Instant::now(),
        }
    }
}
