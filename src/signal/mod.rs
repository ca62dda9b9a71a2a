//! Signal core: phase state machine and presence tracking
//!
//! Both components are plain in-memory state with no I/O. They are owned by
//! the controller actor, which is their only writer.

mod clock;
mod presence;

pub use clock::PhaseClock;
pub use presence::PresenceTracker;
