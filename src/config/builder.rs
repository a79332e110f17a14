//! Builder pattern for session configuration.
//!
//! Provides a fluent API for configuring and creating [`DeviceSession`]
//! instances.
//!
//! # Example
//!
//! ```no_run
//! use terminal_link::{CloudConfig, DeviceSession};
//!
//! # fn example() -> terminal_link::Result<()> {
//! // Terminal on the local network
//! let direct = DeviceSession::builder()
//!     .endpoint("wss://192.168.1.20:12345/remote_pay")
//!     .application_id("com.example.pos:1.0")
//!     .pos_name("Register 1")
//!     .serial_number("SN-0001")
//!     .auth_token("token-from-last-pairing")
//!     .build()?;
//!
//! // Terminal behind the cloud relay
//! let cloud = DeviceSession::builder()
//!     .cloud(CloudConfig::new("https://cloud.example.com", "MID", "TOKEN", "DEVICE"))
//!     .application_id("com.example.pos:1.0")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use url::Url;

use super::cloud::CloudConfig;
use super::options::TransportOptions;
use crate::codec::MethodRegistry;
use crate::error::{Error, Result};
use crate::protocol::Origin;
use crate::session::DeviceSession;
use crate::session::device::SessionParts;
use crate::socket::{SocketFactory, tungstenite_factory};
use crate::transport::{
    CloudEndpoint, DirectEndpoint, EndpointResolver, HttpClient, PairingHandler,
    ReqwestHttpClient, TransportConnection, TransportSetup,
};

// ============================================================================
// Constants
// ============================================================================

/// SDK identifier stamped on envelopes unless overridden.
pub const DEFAULT_SOURCE_SDK: &str = concat!("terminal-link:", env!("CARGO_PKG_VERSION"));

// ============================================================================
// SessionBuilder
// ============================================================================

/// Builder for configuring a [`DeviceSession`].
///
/// Use [`DeviceSession::builder()`] to create a new builder. Exactly one of
/// [`endpoint`](Self::endpoint) and [`cloud`](Self::cloud) must be set.
#[derive(Default, Clone)]
pub struct SessionBuilder {
    endpoint: Option<String>,
    cloud: Option<CloudConfig>,
    pos_name: Option<String>,
    serial_number: Option<String>,
    application_id: Option<String>,
    package_name: Option<String>,
    source_sdk: Option<String>,
    auth_token: Option<String>,
    socket_factory: Option<SocketFactory>,
    pairing_handler: Option<Arc<dyn PairingHandler>>,
    http_client: Option<Arc<dyn HttpClient>>,
    transport_options: TransportOptions,
    registry: Option<Arc<MethodRegistry>>,
    send_discovery: Option<bool>,
    supports_acknowledgement: bool,
}

// ============================================================================
// SessionBuilder Implementation
// ============================================================================

impl SessionBuilder {
    /// Creates a new builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects directly to a terminal on the local network.
    ///
    /// # Arguments
    ///
    /// * `url` - `ws://` or `wss://` URL of the terminal
    #[inline]
    #[must_use]
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    /// Connects through the cloud relay.
    #[inline]
    #[must_use]
    pub fn cloud(mut self, config: CloudConfig) -> Self {
        self.cloud = Some(config);
        self
    }

    /// Sets the POS name shown on the terminal while pairing.
    #[inline]
    #[must_use]
    pub fn pos_name(mut self, name: impl Into<String>) -> Self {
        self.pos_name = Some(name.into());
        self
    }

    /// Sets the POS serial number sent while pairing.
    #[inline]
    #[must_use]
    pub fn serial_number(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    /// Sets the registered application id.
    #[inline]
    #[must_use]
    pub fn application_id(mut self, id: impl Into<String>) -> Self {
        self.application_id = Some(id.into());
        self
    }

    /// Sets the package name. Defaults to the application id without its
    /// `:version` suffix.
    #[inline]
    #[must_use]
    pub fn package_name(mut self, name: impl Into<String>) -> Self {
        self.package_name = Some(name.into());
        self
    }

    /// Overrides the SDK identifier (default [`DEFAULT_SOURCE_SDK`]).
    #[inline]
    #[must_use]
    pub fn source_sdk(mut self, sdk: impl Into<String>) -> Self {
        self.source_sdk = Some(sdk.into());
        self
    }

    /// Presents a token from a previous pairing.
    #[inline]
    #[must_use]
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Replaces the socket implementation (default tokio-tungstenite).
    #[inline]
    #[must_use]
    pub fn socket_factory(mut self, factory: SocketFactory) -> Self {
        self.socket_factory = Some(factory);
        self
    }

    /// Sets the pairing UI.
    #[inline]
    #[must_use]
    pub fn pairing_handler(mut self, handler: Arc<dyn PairingHandler>) -> Self {
        self.pairing_handler = Some(handler);
        self
    }

    /// Replaces the HTTP client used for cloud wake-up (default reqwest).
    #[inline]
    #[must_use]
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets reconnection behavior.
    #[inline]
    #[must_use]
    pub fn transport_options(mut self, options: TransportOptions) -> Self {
        self.transport_options = options;
        self
    }

    /// Shares a payload registry (default [`MethodRegistry::standard`]).
    #[inline]
    #[must_use]
    pub fn registry(mut self, registry: Arc<MethodRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sends a discovery request whenever the transport becomes ready
    /// (default `true`).
    #[inline]
    #[must_use]
    pub fn send_discovery(mut self, enabled: bool) -> Self {
        self.send_discovery = Some(enabled);
        self
    }

    /// Waits for acknowledgements before discovery has confirmed support.
    #[inline]
    #[must_use]
    pub fn supports_acknowledgement(mut self, enabled: bool) -> Self {
        self.supports_acknowledgement = enabled;
        self
    }

    /// Builds the session with validation. Nothing connects until
    /// [`DeviceSession::connect`].
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if a required value is missing or invalid
    /// - [`Error::Url`] if the endpoint or cloud server does not parse
    pub fn build(self) -> Result<DeviceSession> {
        self.transport_options
            .validate()
            .map_err(|e| Error::config(format!("Invalid transport options: {e}")))?;

        let origin = self.validate_origin()?;
        let resolver = self.resolver()?;
        let (pos_name, serial_number) = self.pairing_identity()?;

        let transport = TransportConnection::new(TransportSetup {
            pos_name,
            serial_number,
            origin: origin.clone(),
            auth_token: self.auth_token,
            socket_factory: self.socket_factory.unwrap_or_else(tungstenite_factory),
            resolver,
            pairing_handler: self.pairing_handler,
            options: self.transport_options,
        });

        Ok(DeviceSession::from_parts(SessionParts {
            transport,
            registry: self
                .registry
                .unwrap_or_else(|| Arc::new(MethodRegistry::standard())),
            origin,
            send_discovery: self.send_discovery.unwrap_or(true),
            supports_ack: self.supports_acknowledgement,
        }))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl SessionBuilder {
    /// Validates the routing fields.
    fn validate_origin(&self) -> Result<Origin> {
        let application_id = self
            .application_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                Error::config(
                    "Application id is required. Use .application_id() to set it.\n\
                     Example: DeviceSession::builder().application_id(\"com.example.pos:1.0\")",
                )
            })?;

        let package_name = self.package_name.clone().unwrap_or_else(|| {
            application_id
                .split(':')
                .next()
                .unwrap_or(&application_id)
                .to_string()
        });
        let source_sdk = self
            .source_sdk
            .clone()
            .unwrap_or_else(|| DEFAULT_SOURCE_SDK.to_string());

        Ok(Origin::new(package_name, application_id, source_sdk))
    }

    /// Picks the endpoint resolver.
    fn resolver(&self) -> Result<Arc<dyn EndpointResolver>> {
        match (&self.endpoint, &self.cloud) {
            (Some(_), Some(_)) => Err(Error::config(
                "Both .endpoint() and .cloud() are set. Use one of them.",
            )),
            (None, None) => Err(Error::config(
                "No device endpoint. Use .endpoint() or .cloud() to set one.\n\
                 Example: DeviceSession::builder().endpoint(\"wss://192.168.1.20:12345/remote_pay\")",
            )),
            (Some(url), None) => {
                let parsed = Url::parse(url)?;
                if !matches!(parsed.scheme(), "ws" | "wss") {
                    return Err(Error::config(format!(
                        "Endpoint must use ws:// or wss://, got: {url}"
                    )));
                }
                Ok(Arc::new(DirectEndpoint::new(url.clone())))
            }
            (None, Some(cloud)) => {
                cloud.validate()?;
                let http = self
                    .http_client
                    .clone()
                    .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));
                Ok(Arc::new(CloudEndpoint::new(cloud.clone(), http)))
            }
        }
    }

    /// POS name and serial. Required when pairing directly.
    fn pairing_identity(&self) -> Result<(String, String)> {
        let pos_name = self.pos_name.clone().unwrap_or_default();
        let serial_number = self.serial_number.clone().unwrap_or_default();

        if self.endpoint.is_some() {
            if pos_name.trim().is_empty() {
                return Err(Error::config(
                    "POS name is required for pairing. Use .pos_name() to set it.\n\
                     Example: DeviceSession::builder().pos_name(\"Register 1\")",
                ));
            }
            if serial_number.trim().is_empty() {
                return Err(Error::config(
                    "Serial number is required for pairing. Use .serial_number() to set it.\n\
                     Example: DeviceSession::builder().serial_number(\"SN-0001\")",
                ));
            }
        }

        Ok((pos_name, serial_number))
    }
}

impl fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("endpoint", &self.endpoint)
            .field("cloud", &self.cloud)
            .field("pos_name", &self.pos_name)
            .field("serial_number", &self.serial_number)
            .field("application_id", &self.application_id)
            .field("has_auth_token", &self.auth_token.is_some())
            .field("transport_options", &self.transport_options)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockSocket;

    fn direct() -> SessionBuilder {
        SessionBuilder::new()
            .endpoint("ws://terminal:12345/remote_pay")
            .application_id("com.example.pos:1.0")
            .pos_name("Register 1")
            .serial_number("SN-1")
            .socket_factory(MockSocket::new().factory())
    }

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = SessionBuilder::new();
        assert!(builder.endpoint.is_none());
        assert!(builder.cloud.is_none());
        assert_eq!(builder.transport_options, TransportOptions::default());
    }

    #[test]
    fn test_build_direct() {
        let session = direct().build().expect("session");
        assert_eq!(session.origin().package_name, "com.example.pos");
        assert_eq!(session.origin().application_id, "com.example.pos:1.0");
        assert_eq!(session.origin().source_sdk, DEFAULT_SOURCE_SDK);
        assert!(!session.supports_acknowledgement());
        assert_eq!(session.registry().len(), crate::protocol::Method::ALL.len());
    }

    #[test]
    fn test_build_fails_without_endpoint() {
        let err = SessionBuilder::new()
            .application_id("app")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("endpoint"));
    }

    #[test]
    fn test_build_fails_with_both_endpoints() {
        let err = direct()
            .cloud(CloudConfig::new("https://cloud.example.com", "M", "T", "D"))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_build_fails_without_application_id() {
        let err = SessionBuilder::new()
            .endpoint("ws://terminal")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Application id"));
    }

    #[test]
    fn test_build_rejects_http_endpoint() {
        let err = direct().endpoint("http://terminal").build().unwrap_err();
        assert!(err.to_string().contains("ws://"));
    }

    #[test]
    fn test_direct_requires_pairing_identity() {
        let err = SessionBuilder::new()
            .endpoint("ws://terminal")
            .application_id("app")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("POS name"));
    }

    #[test]
    fn test_cloud_does_not_require_pairing_identity() {
        let session = SessionBuilder::new()
            .cloud(CloudConfig::new("https://cloud.example.com", "M", "T", "D"))
            .application_id("app")
            .http_client(Arc::new(crate::testing::ScriptedHttpClient::new()))
            .build();
        assert!(session.is_ok());
    }

    #[test]
    fn test_invalid_options_rejected() {
        let err = direct()
            .transport_options(TransportOptions::new().with_close_code(1006))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("transport options"));
    }
}
