//! WebSocket protocol message types.
//!
//! This module defines the frame format exchanged between the POS (this
//! crate) and the payment terminal.
//!
//! # Protocol Overview
//!
//! | Envelope Type | Direction | Purpose |
//! |---------------|-----------|---------|
//! | `PING` | Either | Liveness probe |
//! | `PONG` | Either | Liveness answer, no payload |
//! | `COMMAND` | Either | Carries a method and a JSON-encoded payload |
//!
//! # Method Naming
//!
//! Methods are `SCREAMING_SNAKE_CASE` names such as `TX_START`,
//! `VERIFY_SIGNATURE` or `VAULT_CARD_RESPONSE`.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `envelope` | Outer frame and ack payload |
//! | `method` | Method catalog and directions |
//! | `pairing` | Pairing handshake payloads |

// ============================================================================
// Submodules
// ============================================================================

/// Outer envelope frame.
pub mod envelope;

/// Method catalog.
pub mod method;

/// Pairing payloads.
pub mod pairing;

// ============================================================================
// Re-exports
// ============================================================================

pub use envelope::{AckPayload, Envelope, EnvelopeType, Origin};
pub use method::{Direction, Method};
pub use pairing::{PairingCode, PairingRequest, PairingResponse, PairingState};
