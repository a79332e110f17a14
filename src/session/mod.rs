//! Device session layer.
//!
//! Business-level view of a terminal: outbound commands with message ids,
//! acknowledgements, ping handling and typed inbound events.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `device` | [`DeviceSession`], command sending and inbound dispatch |
//! | `observer` | [`DeviceObserver`] business callbacks |

// ============================================================================
// Submodules
// ============================================================================

/// Session and dispatch.
pub mod device;

/// Business callbacks.
pub mod observer;

// ============================================================================
// Re-exports
// ============================================================================

pub use device::{DeviceSession, PendingAck};
pub use observer::DeviceObserver;
