//! Cloud relay endpoint.
//!
//! A device behind the cloud relay is not reachable until it is told to
//! open its side of the relay. Resolution therefore runs a short sequence
//! before every connection attempt:
//!
//! 1. Reuse the relay URL from a previous attempt, or POST a device alert
//!    and build the URL from the answer.
//! 2. Send an `OPTIONS` preflight to the relay and read the id of the
//!    session currently holding the device.
//! 3. Connect, overtake our own stale session, or give up with
//!    [`Error::AccessDenied`].

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use url::Url;

use super::endpoint::{EndpointResolver, OpenAction, ResolveContext, Resolution};
use super::http::HttpClient;
use crate::config::CloudConfig;
use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Preflight response header naming the session holding the device.
pub const CONNECTED_ID_HEADER: &str = "x-remote-connected-id";

/// Relay path appended to the host returned by the alert.
const RELAY_PATH: &str = "/support/remote_pay/cs";

// ============================================================================
// CloudEndpoint
// ============================================================================

/// Resolver for devices reached through the cloud relay. Signals ready as
/// soon as the socket opens.
pub struct CloudEndpoint {
    config: CloudConfig,
    http: Arc<dyn HttpClient>,
    relay_url: Mutex<Option<String>>,
}

impl CloudEndpoint {
    /// Creates a resolver.
    #[must_use]
    pub fn new(config: CloudConfig, http: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http,
            relay_url: Mutex::new(None),
        }
    }

    /// Configuration in use.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CloudConfig {
        &self.config
    }

    /// Relay URL resolved by a previous attempt.
    #[must_use]
    pub fn relay_url(&self) -> Option<String> {
        self.relay_url.lock().clone()
    }

    /// Forgets the cached relay URL so the next attempt alerts the device
    /// again.
    pub fn reset(&self) {
        *self.relay_url.lock() = None;
    }

    /// Alerts the device and builds the relay URL from the answer.
    async fn wake_device(&self) -> Result<String> {
        let alert_url = self.config.alert_url()?;
        let body = json!({
            "deviceId": self.config.device_id().replace('-', ""),
            "isSilent": true,
        });

        debug!(device_id = %self.config.device_id(), "Sending device alert");
        let response = self
            .http
            .post(alert_url.as_str(), &body)
            .await
            .map_err(|e| Error::connection(format!("Device alert failed: {e}")))?;

        if !response.is_success() {
            return Err(Error::connection(format!(
                "Device alert returned HTTP {}",
                response.status
            )));
        }
        if response.body.get("sent").and_then(Value::as_bool) == Some(false) {
            return Err(Error::connection(
                "Device alert was not delivered; the device may be offline",
            ));
        }

        let host = response
            .body
            .get("host")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::connection("Device alert response has no host"))?;
        let token = response
            .body
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::connection("Device alert response has no token"))?;

        let url = self.relay_url_for(host, token)?;
        info!(relay = %url, "Device alerted");
        Ok(url.into())
    }

    /// Builds the `ws(s)://` relay URL.
    fn relay_url_for(&self, host: &str, token: &str) -> Result<Url> {
        let host = if host.contains("://") {
            host.to_string()
        } else {
            format!("https://{host}")
        };

        let mut url = Url::parse(&host)?;
        url.set_path(RELAY_PATH);
        url.query_pairs_mut()
            .clear()
            .append_pair("token", token)
            .append_pair("friendlyId", self.config.friendly_id().as_str())
            .append_pair("forceConnect", &self.config.force_connect().to_string());

        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            _ => "wss",
        };
        url.set_scheme(scheme)
            .map_err(|()| Error::connection(format!("Cannot use relay host {host}")))?;
        Ok(url)
    }

    /// Sends the preflight and returns the id of the session holding the
    /// device. A failed preflight is logged and treated as "nobody".
    async fn connected_id(&self, relay_url: &str) -> Option<String> {
        let preflight_url = match http_variant(relay_url) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Cannot derive preflight URL");
                return None;
            }
        };

        match self.http.options(preflight_url.as_str()).await {
            Ok(response) => response
                .header(CONNECTED_ID_HEADER)
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            Err(e) => {
                warn!(error = %e, "Relay preflight failed, connecting anyway");
                None
            }
        }
    }
}

#[async_trait]
impl EndpointResolver for CloudEndpoint {
    async fn resolve(&self, context: ResolveContext) -> Result<Resolution> {
        let cached = self.relay_url();
        let url = match cached {
            Some(url) => url,
            None => {
                let url = self.wake_device().await?;
                *self.relay_url.lock() = Some(url.clone());
                url
            }
        };

        let mut replace_existing = false;
        if let Some(connected_id) = self.connected_id(&url).await {
            if self.config.friendly_id().as_str() == connected_id {
                info!(friendly_id = %connected_id, "Relay shows our own stale session, replacing it");
                replace_existing = true;
            } else if !self.config.force_connect() {
                warn!(connected_id = %connected_id, "Device is held by another session");
                return Err(Error::access_denied(connected_id));
            } else {
                info!(connected_id = %connected_id, "Overtaking session");
            }
        }

        if context.socket_open && !replace_existing {
            debug!("Socket already open");
            return Ok(Resolution::AlreadyConnected);
        }

        Ok(Resolution::Connect {
            url,
            replace_existing,
        })
    }

    fn open_action(&self) -> OpenAction {
        OpenAction::Ready
    }
}

/// `ws(s)://` → `http(s)://`.
fn http_variant(socket_url: &str) -> Result<Url> {
    let mut url = Url::parse(socket_url)?;
    let scheme = match url.scheme() {
        "ws" | "http" => "http",
        _ => "https",
    };
    url.set_scheme(scheme)
        .map_err(|()| Error::connection(format!("Cannot derive HTTP URL from {socket_url}")))?;
    Ok(url)
}

// ============================================================================
// Tests
// ============================================================================
