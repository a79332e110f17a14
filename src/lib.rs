//! Terminal Link - client-side protocol engine for remote payment terminals.
//!
//! This library lets a point-of-sale application drive a payment terminal
//! over a WebSocket, either directly on the local network or through a
//! cloud relay.
//!
//! # Architecture
//!
//! The engine is layered:
//!
//! - **Socket**: one connection attempt over an injectable adapter
//!   (tokio-tungstenite by default)
//! - **Transport**: connection lifecycle, pairing, cloud wake-up and
//!   reconnection
//! - **Session**: envelopes with message ids, acknowledgements, ping
//!   handling and typed business events
//! - **Codec**: schema-driven decoding of loosely typed payloads
//!
//! Key design principles:
//!
//! - One [`TransportConnection`] owns at most one live socket
//! - Frames are processed in the order the socket delivers them
//! - Connectivity loss is recovered by reconnecting after a fixed delay
//! - Observers are called without any internal lock held
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use terminal_link::{DeviceObserver, DeviceSession, Instance, PairingHandler, Result};
//!
//! struct Console;
//!
//! impl PairingHandler for Console {
//!     fn on_pairing_code(&self, code: &str) {
//!         println!("Enter {code} on the terminal");
//!     }
//!
//!     fn on_pairing_success(&self, token: Option<&str>) -> Result<()> {
//!         println!("Paired, token {token:?}");
//!         Ok(())
//!     }
//! }
//!
//! impl DeviceObserver for Console {
//!     fn on_device_ready(&self, discovery: &Instance) {
//!         println!("Ready: {:?}", discovery.get_str("model"));
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let console = Arc::new(Console);
//!     let session = DeviceSession::builder()
//!         .endpoint("wss://192.168.1.20:12345/remote_pay")
//!         .application_id("com.example.pos:1.0")
//!         .pos_name("Register 1")
//!         .serial_number("SN-0001")
//!         .pairing_handler(console.clone())
//!         .build()?;
//!
//!     session.add_observer(console);
//!     session.connect().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`codec`] | Payload schemas, [`MethodRegistry`] and the transfer routine |
//! | [`config`] | [`SessionBuilder`], [`TransportOptions`], [`CloudConfig`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Message ids and friendly ids |
//! | [`protocol`] | Envelope, method catalog, pairing payloads |
//! | [`session`] | [`DeviceSession`] and [`DeviceObserver`] |
//! | [`socket`] | [`SocketClient`] and the adapter contract |
//! | [`transport`] | [`TransportConnection`], endpoint resolution, cloud wake-up |

// ============================================================================
// Modules
// ============================================================================

/// Schema-driven payload codec.
pub mod codec;

/// Session configuration.
///
/// Use [`DeviceSession::builder()`] to create a configured session.
pub mod config;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Wire protocol types.
pub mod protocol;

/// Device session layer.
pub mod session;

/// Low-level socket client and adapters.
pub mod socket;

/// Connection lifecycle, pairing and reconnection.
pub mod transport;

#[cfg(test)]
mod testing;

// ============================================================================
// Re-exports
// ============================================================================

// Codec types
pub use codec::{FieldValue, Instance, MethodRegistry, TypeDescriptor};

// Configuration types
pub use config::{CloudConfig, SessionBuilder, TransportOptions};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{FriendlyId, MessageId};

// Protocol types
pub use protocol::{Envelope, EnvelopeType, Method, Origin};

// Session types
pub use session::{DeviceObserver, DeviceSession, PendingAck};

// Socket types
pub use socket::{ReadyState, SocketAdapter, SocketClient, SocketFactory, SocketListener};

// Transport types
pub use transport::{
    CloudEndpoint, DirectEndpoint, EndpointResolver, HttpClient, HttpResponse, PairingHandler,
    TransportConnection, TransportObserver,
};
