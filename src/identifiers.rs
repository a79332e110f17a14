//! Type-safe identifiers.
//!
//! Newtype wrappers prevent mixing incompatible IDs at compile time.
//!
//! | Type | Wire form | Source |
//! |------|-----------|--------|
//! | [`MessageId`] | `"1"`, `"2"`, ... | Allocated by the device session |
//! | [`FriendlyId`] | free-form string | Caller or generated UUID v4 |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// MessageId
// ============================================================================

/// Id of an outbound command envelope.
///
/// Serialized as a decimal string. Ids start at `1` and are never reused
/// within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(u64);

impl MessageId {
    /// Wraps a raw id.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw numeric value.
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

// ============================================================================
// MessageIdSequence
// ============================================================================

/// Monotonic allocator for [`MessageId`]s.
#[derive(Debug, Default)]
pub struct MessageIdSequence {
    last: AtomicU64,
}

impl MessageIdSequence {
    /// Creates a sequence whose first id is `1`.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Allocates the next id.
    #[inline]
    pub fn next(&self) -> MessageId {
        MessageId(self.last.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Returns the most recently allocated id, if any.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<MessageId> {
        match self.last.load(Ordering::SeqCst) {
            0 => None,
            n => Some(MessageId(n)),
        }
    }
}

// ============================================================================
// FriendlyId
// ============================================================================

/// Caller-chosen identifier used to arbitrate competing cloud connections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FriendlyId(String);

impl FriendlyId {
    /// Wraps a caller-supplied id.
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a random id.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FriendlyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for FriendlyId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl From<String> for FriendlyId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for FriendlyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_starts_at_one() {
        let seq = MessageIdSequence::new();
        assert_eq!(seq.last(), None);
        assert_eq!(seq.next().to_string(), "1");
        assert_eq!(seq.next().to_string(), "2");
        assert_eq!(seq.last(), Some(MessageId::new(2)));
    }

    #[test]
    fn test_message_id_parse() {
        let id: MessageId = "42".parse().expect("numeric id");
        assert_eq!(id.as_u64(), 42);
        assert!("abc".parse::<MessageId>().is_err());
    }

    #[test]
    fn test_friendly_id_generate_is_unique() {
        let a = FriendlyId::generate();
        let b = FriendlyId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_friendly_id_compares_with_str() {
        let id = FriendlyId::new("register-1");
        assert!(id == *"register-1");
    }
}
