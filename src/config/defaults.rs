//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Signal
// ============================================================================

/// Duration D of GO and STOP, in clock ticks.
pub const PHASE_DURATION_SECS: u32 = 10;

/// Clock period (ms).
pub const TICK_INTERVAL_MS: u64 = 1_000;

/// Shortest clock period accepted by validation (ms).
pub const MIN_TICK_INTERVAL_MS: u64 = 10;

// ============================================================================
// Broadcast
// ============================================================================

/// Events an observer may fall behind before it is resynchronised.
///
/// 64 events = a little over a minute of countdown at 1 Hz.
pub const BROADCAST_CHANNEL_CAPACITY: usize = 64;

/// Depth of the controller's command queue.
pub const COMMAND_QUEUE_CAPACITY: usize = 128;

// ============================================================================
// Server
// ============================================================================

/// Default HTTP bind address.
pub const SERVER_ADDR: &str = "0.0.0.0:3000";

/// Largest accepted detection report body (bytes).
pub const MAX_REPORT_BODY_BYTES: usize = 4 * 1024;

// ============================================================================
// Detection Feed
// ============================================================================

/// HTTP client timeout for the detection feed (seconds).
pub const FEED_HTTP_TIMEOUT_SECS: u64 = 5;
