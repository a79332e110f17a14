//! Socket adapter contract.
//!
//! An adapter is one raw duplex text channel. The crate ships a
//! tokio-tungstenite implementation; tests substitute an in-memory one.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

// ============================================================================
// ReadyState
// ============================================================================

/// Connection state reported by an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReadyState {
    /// Handshake in progress.
    Connecting = 0,
    /// Frames may be sent.
    Open = 1,
    /// Close initiated, waiting for the peer.
    Closing = 2,
    /// Closed or never opened.
    Closed = 3,
}

impl ReadyState {
    /// Decodes the `repr(u8)` value. Unknown values read as closed.
    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connecting,
            1 => Self::Open,
            2 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

// ============================================================================
// SocketListener
// ============================================================================

/// Receives adapter events, in the order the socket produced them.
///
/// Exactly one of [`on_connect_error`](Self::on_connect_error) or
/// [`on_open`](Self::on_open) is delivered per connection attempt, and an
/// opened socket always ends with [`on_disconnected`](Self::on_disconnected).
pub trait SocketListener: Send + Sync {
    /// Handshake completed.
    fn on_open(&self);

    /// Text frame received.
    fn on_text_message(&self, text: &str);

    /// Handshake failed before the socket opened.
    fn on_connect_error(&self, error: &Error);

    /// Socket closed, for any reason.
    fn on_disconnected(&self, code: u16, reason: &str);

    /// Peer sent a close frame.
    fn on_close_frame(&self, _code: u16, _reason: &str) {}

    /// Peer sent a ping frame.
    fn on_ping_frame(&self, _payload: &[u8]) {}

    /// A queued frame could not be written.
    fn on_send_error(&self, _error: &Error) {}
}

// ============================================================================
// SocketAdapter
// ============================================================================

/// Raw duplex text channel.
pub trait SocketAdapter: Send + Sync {
    /// Starts the connection. Events are delivered to `listener`.
    ///
    /// # Errors
    ///
    /// Returns an error if the attempt could not be started at all.
    fn connect(&self, listener: Arc<dyn SocketListener>) -> Result<()>;

    /// Queues a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the socket is not open.
    fn send(&self, text: &str) -> Result<()>;

    /// Queues a pong frame answering a ping.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the socket is not open.
    fn send_pong(&self, payload: &[u8]) -> Result<()>;

    /// Starts the close handshake.
    ///
    /// # Errors
    ///
    /// Returns an error if the close frame could not be queued.
    fn close(&self, code: u16, reason: &str) -> Result<()>;

    /// Current state.
    fn ready_state(&self) -> ReadyState;
}

/// Creates an adapter for an endpoint URL.
pub type SocketFactory = Arc<dyn Fn(&str) -> Result<Arc<dyn SocketAdapter>> + Send + Sync>;

// ============================================================================
// Tests
// ============================================================================
