//! Low-level socket client.
//!
//! A [`SocketClient`] wraps exactly one adapter and one connection attempt.
//! To retry, build a new client.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tracing::{debug, trace, warn};

use super::adapter::{ReadyState, SocketAdapter, SocketFactory, SocketListener};
use crate::error::{Error, Result};

// ============================================================================
// SocketClient
// ============================================================================

/// One connection attempt over an injected adapter.
pub struct SocketClient {
    endpoint: String,
    adapter: Arc<dyn SocketAdapter>,
    listener: Arc<dyn SocketListener>,
    started: AtomicBool,
}

impl SocketClient {
    /// Creates a client for `endpoint` using `factory`.
    ///
    /// # Errors
    ///
    /// Returns whatever the factory returns when it cannot build an adapter.
    pub fn new(
        endpoint: impl Into<String>,
        factory: &SocketFactory,
        listener: Arc<dyn SocketListener>,
    ) -> Result<Self> {
        let endpoint = endpoint.into();
        let adapter = factory(&endpoint)?;
        Ok(Self {
            endpoint,
            adapter,
            listener,
            started: AtomicBool::new(false),
        })
    }

    /// Starts the connection.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyConnecting`] on a second call
    /// - Any error the adapter reports while starting
    pub fn connect(&self) -> Result<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(Error::AlreadyConnecting);
        }

        debug!(endpoint = %self.endpoint, "Connecting socket");
        let forwarder = Arc::new(Forwarder {
            adapter: Arc::downgrade(&self.adapter),
            listener: Arc::clone(&self.listener),
        });
        self.adapter.connect(forwarder)
    }

    /// Sends a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the socket is not open.
    pub fn send(&self, text: &str) -> Result<()> {
        trace!(endpoint = %self.endpoint, len = text.len(), "Sending frame");
        self.adapter.send(text)
    }

    /// Starts the close handshake.
    ///
    /// # Errors
    ///
    /// Returns any error the adapter reports.
    pub fn close(&self, code: u16, reason: &str) -> Result<()> {
        debug!(endpoint = %self.endpoint, code, reason, "Closing socket");
        self.adapter.close(code, reason)
    }

    /// Endpoint this client connects to.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Adapter state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ReadyState {
        self.adapter.ready_state()
    }

    /// Returns `true` if frames may be sent.
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == ReadyState::Open
    }

    /// Returns `true` while the handshake is in progress.
    #[inline]
    #[must_use]
    pub fn is_connecting(&self) -> bool {
        self.state() == ReadyState::Connecting
    }

    /// Returns `true` while the close handshake is in progress.
    #[inline]
    #[must_use]
    pub fn is_closing(&self) -> bool {
        self.state() == ReadyState::Closing
    }
}

impl fmt::Debug for SocketClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketClient")
            .field("endpoint", &self.endpoint)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Forwarder
// ============================================================================

/// Forwards adapter events and answers ping frames.
struct Forwarder {
    adapter: Weak<dyn SocketAdapter>,
    listener: Arc<dyn SocketListener>,
}

impl SocketListener for Forwarder {
    fn on_open(&self) {
        self.listener.on_open();
    }

    fn on_text_message(&self, text: &str) {
        self.listener.on_text_message(text);
    }

    fn on_connect_error(&self, error: &Error) {
        self.listener.on_connect_error(error);
    }

    fn on_disconnected(&self, code: u16, reason: &str) {
        self.listener.on_disconnected(code, reason);
    }

    fn on_close_frame(&self, code: u16, reason: &str) {
        self.listener.on_close_frame(code, reason);
    }

    fn on_ping_frame(&self, payload: &[u8]) {
        if let Some(adapter) = self.adapter.upgrade()
            && let Err(e) = adapter.send_pong(payload)
        {
            warn!(error = %e, "Failed to answer ping frame");
        }
        self.listener.on_ping_frame(payload);
    }

    fn on_send_error(&self, error: &Error) {
        self.listener.on_send_error(error);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockSocket, RecordingSocketListener};

    #[test]
    fn test_connect_twice_fails() {
        let mock = MockSocket::new();
        let listener = Arc::new(RecordingSocketListener::default());
        let client = SocketClient::new("ws://terminal", &mock.factory(), listener).expect("client");

        client.connect().expect("first connect");
        assert!(client.is_connecting());
        assert!(matches!(client.connect(), Err(Error::AlreadyConnecting)));
    }

    #[test]
    fn test_forwards_events_and_answers_pings() {
        let mock = MockSocket::new();
        let listener = Arc::new(RecordingSocketListener::default());
        let client =
            SocketClient::new("ws://terminal", &mock.factory(), Arc::clone(&listener) as _)
                .expect("client");
        client.connect().expect("connect");

        let socket = mock.last().expect("adapter created");
        socket.open();
        assert!(client.is_open());
        socket.receive("hello");
        socket.ping(b"beat");

        assert_eq!(socket.pongs(), vec![b"beat".to_vec()]);
        assert_eq!(listener.events(), vec!["open", "text:hello", "ping"]);
    }

    #[test]
    fn test_send_requires_open() {
        let mock = MockSocket::new();
        let listener = Arc::new(RecordingSocketListener::default());
        let client = SocketClient::new("ws://terminal", &mock.factory(), listener).expect("client");
        client.connect().expect("connect");

        assert!(matches!(client.send("early"), Err(Error::ConnectionClosed)));
        mock.last().expect("adapter").open();
        client.send("late").expect("sent");
        assert_eq!(mock.last().expect("adapter").sent(), vec!["late".to_string()]);
    }
}
