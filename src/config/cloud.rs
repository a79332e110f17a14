//! Cloud relay configuration.

// ============================================================================
// Imports
// ============================================================================

use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::FriendlyId;

// ============================================================================
// CloudConfig
// ============================================================================

/// Settings for reaching a device through the cloud relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudConfig {
    server: String,
    merchant_id: String,
    access_token: String,
    device_id: String,
    friendly_id: FriendlyId,
    force_connect: bool,
}

impl CloudConfig {
    /// Creates a configuration with a generated friendly id and
    /// `force_connect` off.
    ///
    /// # Arguments
    ///
    /// * `server` - Base URL of the cloud server
    /// * `merchant_id` - Merchant owning the device
    /// * `access_token` - OAuth token for the merchant
    /// * `device_id` - Device to wake up
    #[must_use]
    pub fn new(
        server: impl Into<String>,
        merchant_id: impl Into<String>,
        access_token: impl Into<String>,
        device_id: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            merchant_id: merchant_id.into(),
            access_token: access_token.into(),
            device_id: device_id.into(),
            friendly_id: FriendlyId::generate(),
            force_connect: false,
        }
    }

    /// Sets the id this POS presents to the relay.
    #[inline]
    #[must_use]
    pub fn with_friendly_id(mut self, friendly_id: impl Into<FriendlyId>) -> Self {
        self.friendly_id = friendly_id.into();
        self
    }

    /// Take over the device even if another session holds it.
    #[inline]
    #[must_use]
    pub fn with_force_connect(mut self, force_connect: bool) -> Self {
        self.force_connect = force_connect;
        self
    }

    /// Base URL of the cloud server.
    #[inline]
    #[must_use]
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Merchant id.
    #[inline]
    #[must_use]
    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    /// Access token.
    #[inline]
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Device id.
    #[inline]
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Friendly id presented to the relay.
    #[inline]
    #[must_use]
    pub fn friendly_id(&self) -> &FriendlyId {
        &self.friendly_id
    }

    /// Whether an existing session is overtaken.
    #[inline]
    #[must_use]
    pub fn force_connect(&self) -> bool {
        self.force_connect
    }

    /// URL of the device alert endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Url`] if the server URL does not parse.
    pub fn alert_url(&self) -> Result<Url> {
        let base = Url::parse(&self.server)?;
        let mut url = base.join(&format!(
            "v2/merchant/{}/remote_pay/alert",
            self.merchant_id
        ))?;
        url.query_pairs_mut()
            .append_pair("access_token", &self.access_token);
        Ok(url)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first missing value.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("server", &self.server),
            ("merchant_id", &self.merchant_id),
            ("access_token", &self.access_token),
            ("device_id", &self.device_id),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(Error::config(format!(
                    "Cloud {name} is required.\n\
                     Example: CloudConfig::new(server, merchant_id, access_token, device_id)"
                )));
            }
        }
        if self.friendly_id.as_str().is_empty() {
            return Err(Error::config("Cloud friendly_id must not be empty"));
        }
        Url::parse(&self.server)?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CloudConfig {
        CloudConfig::new("https://cloud.example.com/", "M1", "tok", "dev-1")
    }

    #[test]
    fn test_defaults() {
        let config = config();
        assert!(!config.force_connect());
        assert!(!config.friendly_id().as_str().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_alert_url() {
        let url = config().alert_url().expect("url");
        assert_eq!(
            url.as_str(),
            "https://cloud.example.com/v2/merchant/M1/remote_pay/alert?access_token=tok"
        );
    }

    #[test]
    fn test_missing_values_rejected() {
        let config = CloudConfig::new("https://cloud.example.com/", "", "tok", "dev");
        assert!(matches!(config.validate(), Err(Error::Config { .. })));

        let config = CloudConfig::new("not a url", "M1", "tok", "dev");
        assert!(matches!(config.validate(), Err(Error::Url(_))));
    }

    #[test]
    fn test_friendly_id_override() {
        let config = config()
            .with_friendly_id("register-7")
            .with_force_connect(true);
        assert_eq!(config.friendly_id().as_str(), "register-7");
        assert!(config.force_connect());
    }
}
