//! tokio-tungstenite socket adapter.
//!
//! Each adapter spawns one event loop task on connect. The task owns the
//! WebSocket stream; the adapter talks to it through an unbounded channel.
//!
//! # Event Loop
//!
//! The task handles:
//!
//! - The handshake (`ws://` or `wss://`)
//! - Incoming text, ping and close frames
//! - Outgoing text, pong and close frames
//! - Reporting the final close to the listener

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tracing::{debug, error, trace, warn};
use url::Url;

use super::adapter::{ReadyState, SocketAdapter, SocketFactory, SocketListener};
use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Close code reported when the stream ends without a close frame.
const ABNORMAL_CLOSURE: u16 = 1006;

/// Close code reported for a close frame without a status.
const NO_STATUS_RECEIVED: u16 = 1005;

// ============================================================================
// Types
// ============================================================================

/// Frames queued for the event loop.
enum Outbound {
    Text(String),
    Pong(Vec<u8>),
    Close { code: u16, reason: String },
}

// ============================================================================
// TungsteniteAdapter
// ============================================================================

/// WebSocket adapter backed by tokio-tungstenite.
///
/// Must be connected from inside a tokio runtime.
pub struct TungsteniteAdapter {
    endpoint: Url,
    state: Arc<AtomicU8>,
    outbound: Mutex<Option<mpsc::UnboundedSender<Outbound>>>,
}

impl TungsteniteAdapter {
    /// Creates an adapter for a `ws://` or `wss://` URL.
    ///
    /// # Errors
    ///
    /// - [`Error::Url`] if `endpoint` does not parse
    /// - [`Error::Config`] if the scheme is not `ws` or `wss`
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        if !matches!(endpoint.scheme(), "ws" | "wss") {
            return Err(Error::config(format!(
                "Unsupported socket scheme '{}' (expected ws or wss)",
                endpoint.scheme()
            )));
        }

        Ok(Self {
            endpoint,
            state: Arc::new(AtomicU8::new(ReadyState::Closed as u8)),
            outbound: Mutex::new(None),
        })
    }

    fn queue(&self, frame: Outbound) -> Result<()> {
        if self.ready_state() != ReadyState::Open {
            return Err(Error::ConnectionClosed);
        }
        let guard = self.outbound.lock();
        let tx = guard.as_ref().ok_or(Error::ConnectionClosed)?;
        tx.send(frame).map_err(|_| Error::ConnectionClosed)
    }

    /// Event loop that owns the WebSocket stream.
    async fn run_event_loop(
        endpoint: Url,
        state: Arc<AtomicU8>,
        mut outbound_rx: mpsc::UnboundedReceiver<Outbound>,
        listener: Arc<dyn SocketListener>,
    ) {
        let ws_stream = match connect_async(endpoint.as_str()).await {
            Ok((ws_stream, _response)) => ws_stream,
            Err(e) => {
                state.store(ReadyState::Closed as u8, Ordering::SeqCst);
                debug!(endpoint = %endpoint, error = %e, "Socket handshake failed");
                listener.on_connect_error(&Error::WebSocket(e));
                return;
            }
        };

        let (mut ws_write, mut ws_read) = ws_stream.split();

        // close() during the handshake leaves the state at Closing.
        let opened = state
            .compare_exchange(
                ReadyState::Connecting as u8,
                ReadyState::Open as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok();
        if !opened {
            let _ = ws_write.close().await;
            state.store(ReadyState::Closed as u8, Ordering::SeqCst);
            listener.on_disconnected(1000, "closed during handshake");
            return;
        }

        debug!(endpoint = %endpoint, "Socket open");
        listener.on_open();

        let (code, reason) = loop {
            tokio::select! {
                // Incoming frames
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            listener.on_text_message(text.as_str());
                        }

                        Some(Ok(Message::Ping(payload))) => {
                            listener.on_ping_frame(&payload);
                        }

                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (u16::from(f.code), f.reason.as_str().to_string()))
                                .unwrap_or((NO_STATUS_RECEIVED, String::new()));
                            debug!(code, reason = %reason, "Close frame received");
                            listener.on_close_frame(code, &reason);
                            break (code, reason);
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break (ABNORMAL_CLOSURE, e.to_string());
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break (ABNORMAL_CLOSURE, String::new());
                        }

                        // Binary and pong frames are not used
                        Some(Ok(_)) => {}
                    }
                }

                // Frames from the adapter
                frame = outbound_rx.recv() => {
                    match frame {
                        Some(Outbound::Text(text)) => {
                            if let Err(e) = ws_write.send(Message::Text(text.into())).await {
                                warn!(error = %e, "Failed to send frame");
                                listener.on_send_error(&Error::WebSocket(e));
                            } else {
                                trace!("Frame sent");
                            }
                        }

                        Some(Outbound::Pong(payload)) => {
                            if let Err(e) = ws_write.send(Message::Pong(payload.into())).await {
                                warn!(error = %e, "Failed to send pong");
                            }
                        }

                        Some(Outbound::Close { code, reason }) => {
                            let frame = CloseFrame {
                                code: CloseCode::from(code),
                                reason: reason.clone().into(),
                            };
                            if let Err(e) = ws_write.send(Message::Close(Some(frame))).await {
                                debug!(error = %e, "Close frame not sent");
                            }
                            break (code, reason);
                        }

                        None => {
                            debug!("Adapter dropped, closing socket");
                            let _ = ws_write.close().await;
                            break (1000, String::new());
                        }
                    }
                }
            }
        };

        state.store(ReadyState::Closed as u8, Ordering::SeqCst);
        listener.on_disconnected(code, &reason);
        debug!(endpoint = %endpoint, code, "Event loop terminated");
    }
}

impl SocketAdapter for TungsteniteAdapter {
    fn connect(&self, listener: Arc<dyn SocketListener>) -> Result<()> {
        let handle = Handle::try_current()
            .map_err(|e| Error::connection(format!("No tokio runtime: {e}")))?;

        let (tx, rx) = mpsc::unbounded_channel();
        *self.outbound.lock() = Some(tx);
        self.state
            .store(ReadyState::Connecting as u8, Ordering::SeqCst);

        handle.spawn(Self::run_event_loop(
            self.endpoint.clone(),
            Arc::clone(&self.state),
            rx,
            listener,
        ));
        Ok(())
    }

    fn send(&self, text: &str) -> Result<()> {
        self.queue(Outbound::Text(text.to_string()))
    }

    fn send_pong(&self, payload: &[u8]) -> Result<()> {
        self.queue(Outbound::Pong(payload.to_vec()))
    }

    fn close(&self, code: u16, reason: &str) -> Result<()> {
        match self.ready_state() {
            ReadyState::Connecting => {
                self.state.store(ReadyState::Closing as u8, Ordering::SeqCst);
                Ok(())
            }
            ReadyState::Open => {
                let result = self.queue(Outbound::Close {
                    code,
                    reason: reason.to_string(),
                });
                self.state.store(ReadyState::Closing as u8, Ordering::SeqCst);
                result
            }
            ReadyState::Closing | ReadyState::Closed => Ok(()),
        }
    }

    fn ready_state(&self) -> ReadyState {
        ReadyState::from_u8(self.state.load(Ordering::SeqCst))
    }
}

/// Factory producing [`TungsteniteAdapter`]s.
#[must_use]
pub fn tungstenite_factory() -> SocketFactory {
    Arc::new(|endpoint: &str| {
        let adapter: Arc<dyn SocketAdapter> = Arc::new(TungsteniteAdapter::new(endpoint)?);
        Ok(adapter)
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_socket_scheme() {
        assert!(matches!(
            TungsteniteAdapter::new("http://terminal:12345"),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            TungsteniteAdapter::new("not a url"),
            Err(Error::Url(_))
        ));
    }

    #[test]
    fn test_initial_state_is_closed() {
        let adapter = TungsteniteAdapter::new("wss://terminal:12345/remote_pay").expect("adapter");
        assert_eq!(adapter.ready_state(), ReadyState::Closed);
        assert!(matches!(adapter.send("x"), Err(Error::ConnectionClosed)));
    }

    #[test]
    fn test_connect_outside_runtime_fails() {
        let adapter = TungsteniteAdapter::new("ws://127.0.0.1:1").expect("adapter");
        let listener = Arc::new(crate::testing::RecordingSocketListener::default());
        assert!(matches!(
            adapter.connect(listener),
            Err(Error::Connection { .. })
        ));
    }
}
