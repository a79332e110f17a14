//! Transport tuning options.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use terminal_link::TransportOptions;
//!
//! let options = TransportOptions::new()
//!     .with_reconnect_delay(Duration::from_secs(5))
//!     .with_reconnect_on_connect_error(true);
//! assert!(options.validate().is_ok());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Delay between a disconnect and the next connection attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Close code sent when the transport is disposed.
pub const NORMAL_CLOSURE: u16 = 1000;

// ============================================================================
// TransportOptions
// ============================================================================

/// Reconnection and shutdown behavior of a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    /// Fixed delay before each reconnection attempt. There is no backoff.
    pub reconnect_delay: Duration,

    /// Also reconnect after a failed handshake. By default only a close
    /// after a successful open triggers a reconnect.
    pub reconnect_on_connect_error: bool,

    /// Close code sent on dispose.
    pub close_code: u16,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            reconnect_on_connect_error: false,
            close_code: NORMAL_CLOSURE,
        }
    }
}

impl TransportOptions {
    /// Creates options with default values.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reconnection delay.
    #[inline]
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Enables or disables reconnecting after a failed handshake.
    #[inline]
    #[must_use]
    pub fn with_reconnect_on_connect_error(mut self, enabled: bool) -> Self {
        self.reconnect_on_connect_error = enabled;
        self
    }

    /// Sets the close code sent on dispose.
    #[inline]
    #[must_use]
    pub fn with_close_code(mut self, code: u16) -> Self {
        self.close_code = code;
        self
    }

    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.reconnect_delay.is_zero() {
            return Err("reconnect_delay must be greater than zero".to_string());
        }
        // 1000..=4999 are the codes an endpoint may send.
        if !(1000..5000).contains(&self.close_code) || matches!(self.close_code, 1005 | 1006 | 1015)
        {
            return Err(format!("close_code {} cannot be sent", self.close_code));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = TransportOptions::default();
        assert_eq!(options.reconnect_delay, Duration::from_secs(3));
        assert!(!options.reconnect_on_connect_error);
        assert_eq!(options.close_code, 1000);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let options = TransportOptions::new()
            .with_reconnect_delay(Duration::from_millis(250))
            .with_reconnect_on_connect_error(true)
            .with_close_code(4000);
        assert_eq!(options.reconnect_delay, Duration::from_millis(250));
        assert!(options.reconnect_on_connect_error);
        assert_eq!(options.close_code, 4000);
    }

    #[test]
    fn test_validation() {
        assert!(
            TransportOptions::new()
                .with_reconnect_delay(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(TransportOptions::new().with_close_code(1006).validate().is_err());
        assert!(TransportOptions::new().with_close_code(999).validate().is_err());
    }
}
