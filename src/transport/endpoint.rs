//! Endpoint resolution.
//!
//! The transport state machine is the same for every deployment. What
//! differs is how the socket URL is found and what happens once the socket
//! opens; an [`EndpointResolver`] supplies both.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;

use crate::error::Result;

// ============================================================================
// Types
// ============================================================================

/// State the resolver may consult.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveContext {
    /// A socket is currently open.
    pub socket_open: bool,
}

/// Outcome of a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Connect to `url`. With `replace_existing`, any local socket is closed
    /// first.
    Connect {
        /// Socket URL.
        url: String,
        /// Close the current socket before connecting.
        replace_existing: bool,
    },
    /// The open socket is healthy; nothing to do.
    AlreadyConnected,
}

/// What the transport does when a socket opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAction {
    /// Send a pairing request; ready follows a successful pairing.
    Pair,
    /// Signal ready immediately.
    Ready,
}

// ============================================================================
// EndpointResolver
// ============================================================================

/// Finds the socket URL for the next connection attempt.
#[async_trait]
pub trait EndpointResolver: Send + Sync {
    /// Resolves the URL to connect to.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`](crate::Error::Connection) if the endpoint
    ///   cannot be found
    /// - [`Error::AccessDenied`](crate::Error::AccessDenied) if another
    ///   session owns the device
    async fn resolve(&self, context: ResolveContext) -> Result<Resolution>;

    /// Action taken when a socket opens.
    fn open_action(&self) -> OpenAction;
}

// ============================================================================
// DirectEndpoint
// ============================================================================

/// Fixed URL on the local network. Pairs on open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectEndpoint {
    url: String,
}

impl DirectEndpoint {
    /// Creates a resolver for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// The fixed URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl EndpointResolver for DirectEndpoint {
    async fn resolve(&self, _context: ResolveContext) -> Result<Resolution> {
        Ok(Resolution::Connect {
            url: self.url.clone(),
            replace_existing: false,
        })
    }

    fn open_action(&self) -> OpenAction {
        OpenAction::Pair
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_direct_endpoint() {
        let endpoint = DirectEndpoint::new("wss://192.168.1.20:12345/remote_pay");
        let resolution = endpoint
            .resolve(ResolveContext { socket_open: true })
            .await
            .expect("resolved");

        assert_eq!(
            resolution,
            Resolution::Connect {
                url: "wss://192.168.1.20:12345/remote_pay".to_string(),
                replace_existing: false,
            }
        );
        assert_eq!(endpoint.open_action(), OpenAction::Pair);
    }
}
