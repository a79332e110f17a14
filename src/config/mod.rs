//! Session configuration.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `builder` | [`SessionBuilder`], fluent session setup with validation |
//! | `cloud` | [`CloudConfig`], cloud relay credentials |
//! | `options` | [`TransportOptions`], reconnection tuning |

// ============================================================================
// Submodules
// ============================================================================

/// Fluent session setup.
pub mod builder;

/// Cloud relay settings.
pub mod cloud;

/// Reconnection tuning.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::{DEFAULT_SOURCE_SDK, SessionBuilder};
pub use cloud::CloudConfig;
pub use options::{DEFAULT_RECONNECT_DELAY, NORMAL_CLOSURE, TransportOptions};
