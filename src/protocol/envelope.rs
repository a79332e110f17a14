//! Envelope wire frame.
//!
//! Every text frame on the socket is one envelope:
//!
//! ```json
//! {
//!   "id": "7",
//!   "type": "COMMAND",
//!   "packageName": "com.example.pos",
//!   "method": "TIP_ADDED",
//!   "payload": "{\"tipAmount\":150}",
//!   "remoteSourceSDK": "terminal-link:0.1.0",
//!   "applicationId": "com.example.pos.register"
//! }
//! ```
//!
//! `method` and `payload` are present only on `COMMAND` envelopes, and
//! `payload` is itself a JSON-encoded string, not a nested object. `id` is
//! present only when an acknowledgement is expected.

// ============================================================================
// Imports
// ============================================================================

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::identifiers::MessageId;

use super::Method;

// ============================================================================
// EnvelopeType
// ============================================================================

/// Envelope type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnvelopeType {
    /// Liveness probe; must be answered with [`EnvelopeType::Pong`].
    Ping,
    /// Answer to a ping.
    Pong,
    /// Carries a method and payload.
    Command,
}

// ============================================================================
// Origin
// ============================================================================

/// Routing fields stamped on every outbound envelope.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Origin {
    /// Package name of the POS application.
    pub package_name: String,
    /// Application id registered for the POS.
    pub application_id: String,
    /// SDK identifier, `name:version`.
    pub source_sdk: String,
}

impl Origin {
    /// Creates an origin.
    #[must_use]
    pub fn new(
        package_name: impl Into<String>,
        application_id: impl Into<String>,
        source_sdk: impl Into<String>,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            application_id: application_id.into(),
            source_sdk: source_sdk.into(),
        }
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// One protocol frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Message id, present when an acknowledgement is expected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Frame type.
    #[serde(rename = "type")]
    pub envelope_type: EnvelopeType,

    /// Package name of the sender's POS application.
    #[serde(default)]
    pub package_name: String,

    /// Method name (commands only). Kept as a string so unknown methods
    /// survive parsing and can be logged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// JSON-encoded message body (commands only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,

    /// SDK identifier of the sender.
    #[serde(rename = "remoteSourceSDK", default)]
    pub source_sdk: String,

    /// Application id of the sender.
    #[serde(default)]
    pub application_id: String,
}

impl Envelope {
    /// Creates a command envelope.
    #[must_use]
    pub fn command(
        id: Option<MessageId>,
        method: Method,
        payload: impl Into<String>,
        origin: &Origin,
    ) -> Self {
        Self {
            id: id.map(|id| id.to_string()),
            envelope_type: EnvelopeType::Command,
            package_name: origin.package_name.clone(),
            method: Some(method.as_str().to_string()),
            payload: Some(payload.into()),
            source_sdk: origin.source_sdk.clone(),
            application_id: origin.application_id.clone(),
        }
    }

    /// Creates a ping envelope.
    #[must_use]
    pub fn ping(origin: &Origin) -> Self {
        Self::bare(EnvelopeType::Ping, origin)
    }

    /// Creates a pong envelope. Pongs never carry a payload.
    #[must_use]
    pub fn pong(origin: &Origin) -> Self {
        Self::bare(EnvelopeType::Pong, origin)
    }

    fn bare(envelope_type: EnvelopeType, origin: &Origin) -> Self {
        Self {
            id: None,
            envelope_type,
            package_name: origin.package_name.clone(),
            method: None,
            payload: None,
            source_sdk: origin.source_sdk.clone(),
            application_id: origin.application_id.clone(),
        }
    }

    /// Parses an envelope from a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the frame is not a valid envelope.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serializes the envelope to a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Resolves the method name against the catalog.
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] if the envelope carries no method
    /// - [`Error::UnknownMethod`] if the method is not in the catalog
    pub fn method_kind(&self) -> Result<Method> {
        self.method
            .as_deref()
            .ok_or_else(|| Error::protocol("command envelope without method"))?
            .parse()
    }

    /// Returns `true` for command envelopes.
    #[inline]
    #[must_use]
    pub fn is_command(&self) -> bool {
        self.envelope_type == EnvelopeType::Command
    }

    /// Decodes the payload into a concrete type.
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] if the envelope has no payload
    /// - [`Error::Json`] if the payload does not match `T`
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T> {
        let payload = self
            .payload
            .as_deref()
            .ok_or_else(|| Error::protocol("envelope without payload"))?;
        Ok(serde_json::from_str(payload)?)
    }
}

// ============================================================================
// AckPayload
// ============================================================================

/// Body of an `ACK` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckPayload {
    /// Id of the command being acknowledged.
    pub source_message_id: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Origin {
        Origin::new("p", "a", "s")
    }

    #[test]
    fn test_command_serialization() {
        let envelope = Envelope::command(
            Some(MessageId::new(1)),
            Method::ShowWelcomeScreen,
            "{}",
            &origin(),
        );
        let json = envelope.to_json().expect("serialize");

        assert!(json.contains(r#""id":"1""#));
        assert!(json.contains(r#""type":"COMMAND""#));
        assert!(json.contains(r#""method":"SHOW_WELCOME_SCREEN""#));
        assert!(json.contains(r#""remoteSourceSDK":"s""#));
        assert!(json.contains(r#""packageName":"p""#));
        assert!(json.contains(r#""applicationId":"a""#));
    }

    #[test]
    fn test_pong_has_no_payload_or_method() {
        let json = Envelope::pong(&origin()).to_json().expect("serialize");
        assert!(json.contains(r#""type":"PONG""#));
        assert!(!json.contains("payload"));
        assert!(!json.contains("method"));
        assert!(!json.contains(r#""id""#));
    }

    #[test]
    fn test_parse_ping() {
        let envelope = Envelope::from_json(
            r#"{"type":"PING","packageName":"p","applicationId":"a","remoteSourceSDK":"s"}"#,
        )
        .expect("parse");
        assert_eq!(envelope.envelope_type, EnvelopeType::Ping);
        assert_eq!(envelope.package_name, "p");
        assert!(envelope.method.is_none());
    }

    #[test]
    fn test_method_kind() {
        let envelope = Envelope::from_json(
            r#"{"type":"COMMAND","method":"TIP_ADDED","payload":"{\"tipAmount\":5}"}"#,
        )
        .expect("parse");
        assert_eq!(envelope.method_kind().expect("known"), Method::TipAdded);

        let unknown = Envelope::from_json(r#"{"type":"COMMAND","method":"WHAT"}"#).expect("parse");
        assert!(matches!(
            unknown.method_kind(),
            Err(Error::UnknownMethod { .. })
        ));
    }

    #[test]
    fn test_parse_ack_payload() {
        let envelope = Envelope::from_json(
            r#"{"type":"COMMAND","method":"ACK","payload":"{\"sourceMessageId\":\"3\"}"}"#,
        )
        .expect("parse");
        let ack: AckPayload = envelope.parse_payload().expect("ack payload");
        assert_eq!(ack.source_message_id, "3");
    }

    #[test]
    fn test_malformed_envelope() {
        assert!(Envelope::from_json("not json").is_err());
        assert!(Envelope::from_json(r#"{"type":"BOGUS"}"#).is_err());
    }
}
