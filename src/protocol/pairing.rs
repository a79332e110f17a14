//! Pairing payloads.
//!
//! | Method | Direction | Body |
//! |--------|-----------|------|
//! | `PAIRING_REQUEST` | POS → device | [`PairingRequest`] |
//! | `PAIRING_CODE` | device → POS | [`PairingCode`] |
//! | `PAIRING_RESPONSE` | device → POS | [`PairingResponse`] |

use serde::{Deserialize, Serialize};

/// Pairing outcome reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PairingState {
    /// Paired using a previously issued token.
    Paired,
    /// Newly paired after code entry.
    Initial,
    /// Pairing was refused; the POS retries.
    Failed,
}

impl PairingState {
    /// Returns `true` when business traffic may flow.
    #[inline]
    #[must_use]
    pub const fn is_paired(self) -> bool {
        matches!(self, Self::Paired | Self::Initial)
    }
}

/// Sent by the POS as soon as the socket opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingRequest {
    /// POS name shown on the device.
    pub name: String,
    /// Serial number of the POS.
    pub serial_number: String,
    /// Application name, same as `name`.
    pub application_name: String,
    /// Token from a previous pairing, serialized as `null` when absent.
    pub authentication_token: Option<String>,
}

impl PairingRequest {
    /// Builds a request for a POS name and serial, presenting a stored token.
    #[must_use]
    pub fn new(pos_name: &str, serial_number: &str, token: Option<&str>) -> Self {
        Self {
            name: pos_name.to_string(),
            serial_number: serial_number.to_string(),
            application_name: pos_name.to_string(),
            authentication_token: token.map(str::to_string),
        }
    }
}

/// Code the operator must type on the POS to complete pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingCode {
    /// Code displayed on the device.
    pub pairing_code: String,
}

/// Result of a pairing attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingResponse {
    /// Outcome.
    pub pairing_state: PairingState,
    /// Token to present on the next connection.
    #[serde(default)]
    pub authentication_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_null_token() {
        let json = serde_json::to_string(&PairingRequest::new("Register 1", "SN-1", None))
            .expect("serialize");
        assert_eq!(
            json,
            r#"{"name":"Register 1","serialNumber":"SN-1","applicationName":"Register 1","authenticationToken":null}"#
        );
    }

    #[test]
    fn test_response_states() {
        let paired: PairingResponse =
            serde_json::from_str(r#"{"pairingState":"PAIRED","authenticationToken":"tok1"}"#)
                .expect("parse");
        assert!(paired.pairing_state.is_paired());
        assert_eq!(paired.authentication_token.as_deref(), Some("tok1"));

        let failed: PairingResponse =
            serde_json::from_str(r#"{"pairingState":"FAILED"}"#).expect("parse");
        assert!(!failed.pairing_state.is_paired());
        assert!(failed.authentication_token.is_none());
    }
}
