//! Transport lifecycle observers and the pairing UI capability.

use crate::error::{Error, Result};

// ============================================================================
// TransportObserver
// ============================================================================

/// Receives transport lifecycle events.
///
/// Callbacks run on whatever task delivered the socket event and must not
/// block. All methods default to no-ops.
pub trait TransportObserver: Send + Sync {
    /// Socket opened.
    fn on_connected(&self) {}

    /// Business traffic may flow: pairing succeeded, or the cloud relay
    /// accepted the socket. Fired once per pairing.
    fn on_ready(&self) {}

    /// Socket closed, failed to open, or the transport was disposed.
    fn on_disconnected(&self) {}

    /// Raw text frame received after pairing.
    fn on_message(&self, _text: &str) {}

    /// A connection attempt failed. [`Error::AccessDenied`] means another
    /// session owns the device and no reconnect follows.
    fn on_connection_error(&self, _error: &Error) {}
}

// ============================================================================
// PairingHandler
// ============================================================================

/// Surfaces the pairing handshake to the operator.
pub trait PairingHandler: Send + Sync {
    /// The device shows a code that must be entered on the POS.
    fn on_pairing_code(&self, code: &str);

    /// Pairing succeeded. `token` should be persisted and supplied on the
    /// next start. An error is logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Implementations may fail, for example when the token cannot be
    /// stored.
    fn on_pairing_success(&self, token: Option<&str>) -> Result<()>;
}
