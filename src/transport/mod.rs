//! Device transport layer.
//!
//! Owns the socket lifecycle between the POS (this crate) and one payment
//! terminal: endpoint resolution, pairing and reconnection.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐                              ┌─────────────────┐
//! │  DeviceSession   │                              │  Terminal       │
//! │        │         │         WebSocket            │                 │
//! │ TransportConn.   │◄────────────────────────────►│  Remote pay     │
//! │        │         │   direct, or via cloud relay │  service        │
//! │  SocketClient    │                              │                 │
//! └──────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. [`EndpointResolver::resolve`] - Pick the socket URL (direct, or wake
//!    the device through the cloud)
//! 2. [`TransportConnection::initialize`] - Open a socket
//! 3. Pair (direct) or signal ready right away (cloud)
//! 4. Forward business frames to [`TransportObserver`]s
//! 5. On close, reconnect after a fixed delay until disposed
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Lifecycle, pairing and reconnection |
//! | `endpoint` | Endpoint resolution and the direct resolver |
//! | `cloud` | Cloud relay wake-up and conflict detection |
//! | `http` | HTTP client seam for the cloud resolver |
//! | `observer` | Transport and pairing callbacks |

// ============================================================================
// Submodules
// ============================================================================

/// Cloud relay resolver.
pub mod cloud;

/// Transport lifecycle.
pub mod connection;

/// Endpoint resolution.
pub mod endpoint;

/// HTTP client seam.
pub mod http;

/// Transport callbacks.
pub mod observer;

// ============================================================================
// Re-exports
// ============================================================================

pub use cloud::{CONNECTED_ID_HEADER, CloudEndpoint};
pub use connection::{TransportConnection, TransportSetup};
pub use endpoint::{DirectEndpoint, EndpointResolver, OpenAction, ResolveContext, Resolution};
pub use http::{HttpClient, HttpResponse, ReqwestHttpClient};
pub use observer::{PairingHandler, TransportObserver};
