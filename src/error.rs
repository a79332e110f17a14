//! Error types for the terminal link.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use terminal_link::{DeviceSession, Result};
//!
//! fn example(session: &DeviceSession) -> Result<()> {
//!     session.show_welcome_screen()?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`], [`Error::AlreadyConnecting`] |
//! | Conflict | [`Error::AccessDenied`] |
//! | Protocol | [`Error::UnknownMethod`], [`Error::Protocol`], [`Error::Pairing`] |
//! | Codec | [`Error::Codec`] |
//! | External | [`Error::Json`], [`Error::WebSocket`], [`Error::Http`], [`Error::Url`] |
//!
//! Nothing here is fatal to the process. Connection failures are recovered
//! by reconnection, protocol and codec failures drop a single frame or field.

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when session or transport configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Socket could not be created or opened, or the cloud wake-up failed.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// No open socket is available.
    ///
    /// Returned by sends while disconnected or after dispose.
    #[error("Connection closed")]
    ConnectionClosed,

    /// `connect()` was called twice on the same socket client.
    ///
    /// One client is one connection attempt; construct a new client to retry.
    #[error("Socket client already started a connection attempt")]
    AlreadyConnecting,

    /// Another session already owns the device.
    ///
    /// Returned by the cloud conflict check when `force_connect` is off.
    #[error("Access denied: device already connected to {connected_id}")]
    AccessDenied {
        /// Friendly id of the session currently holding the device.
        connected_id: String,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Envelope carried a method this crate does not know.
    #[error("Unknown method: {method}")]
    UnknownMethod {
        /// The unrecognized method name.
        method: String,
    },

    /// Protocol violation or malformed frame.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    /// Pairing callback or pairing exchange failure.
    #[error("Pairing error: {message}")]
    Pairing {
        /// Description of the pairing failure.
        message: String,
    },

    // ========================================================================
    // Codec Errors
    // ========================================================================
    /// A payload field could not be converted into its declared type.
    #[error("Codec error on field `{field}`: {message}")]
    Codec {
        /// Field that failed to convert.
        field: String,
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parse error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Channel receive error.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates an access denied error.
    #[inline]
    pub fn access_denied(connected_id: impl Into<String>) -> Self {
        Self::AccessDenied {
            connected_id: connected_id.into(),
        }
    }

    /// Creates an unknown method error.
    #[inline]
    pub fn unknown_method(method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            method: method.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a pairing error.
    #[inline]
    pub fn pairing(message: impl Into<String>) -> Self {
        Self::Pairing {
            message: message.into(),
        }
    }

    /// Creates a codec error.
    #[inline]
    pub fn codec(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Codec {
            field: field.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionClosed
                | Self::AlreadyConnecting
                | Self::WebSocket(_)
                | Self::Http(_)
        )
    }

    /// Returns `true` if another session owns the device.
    #[inline]
    #[must_use]
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }

    /// Returns `true` if this error only affects a single frame or field.
    #[inline]
    #[must_use]
    pub fn is_frame_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownMethod { .. } | Self::Protocol { .. } | Self::Codec { .. } | Self::Json(_)
        )
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors are healed by the reconnect loop. A conflict is
    /// not: the attempt is abandoned until the caller retries.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionClosed | Self::WebSocket(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::connection("failed to connect");
        assert_eq!(err.to_string(), "Connection failed: failed to connect");
    }

    #[test]
    fn test_access_denied_display() {
        let err = Error::access_denied("register-2");
        assert_eq!(
            err.to_string(),
            "Access denied: device already connected to register-2"
        );
        assert!(err.is_access_denied());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_is_connection_error() {
        let conn_err = Error::connection("test");
        let closed_err = Error::ConnectionClosed;
        let other_err = Error::config("test");

        assert!(conn_err.is_connection_error());
        assert!(closed_err.is_connection_error());
        assert!(!other_err.is_connection_error());
    }

    #[test]
    fn test_frame_errors() {
        assert!(Error::unknown_method("NOPE").is_frame_error());
        assert!(Error::codec("items", "not an array").is_frame_error());
        assert!(!Error::ConnectionClosed.is_frame_error());
    }

    #[test]
    fn test_codec_display() {
        let err = Error::codec("items", "expected array");
        assert_eq!(
            err.to_string(),
            "Codec error on field `items`: expected array"
        );
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
