//! Socket layer.
//!
//! The transport never touches a WebSocket library directly. It builds a
//! [`SocketClient`] per connection attempt from an injected
//! [`SocketFactory`], and receives events through [`SocketListener`].
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `adapter` | Adapter contract, ready state, listener |
//! | `client` | One-shot client wrapping an adapter |
//! | `tungstenite` | tokio-tungstenite adapter |

// ============================================================================
// Submodules
// ============================================================================

/// Adapter contract.
pub mod adapter;

/// Low-level socket client.
pub mod client;

/// tokio-tungstenite adapter.
pub mod tungstenite;

// ============================================================================
// Re-exports
// ============================================================================

pub use adapter::{ReadyState, SocketAdapter, SocketFactory, SocketListener};
pub use client::SocketClient;
pub use tungstenite::{TungsteniteAdapter, tungstenite_factory};
