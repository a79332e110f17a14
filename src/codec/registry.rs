//! Method → payload type registry.
//!
//! A [`MethodRegistry`] is built once and shared by reference (usually as an
//! `Arc`) with every session that decodes payloads. There is no global
//! registry.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::debug;

use super::instance::Instance;
use super::messages::descriptor_for;
use super::schema::TypeDescriptor;
use super::transfer::transfer;
use crate::error::Result;
use crate::protocol::Method;

// ============================================================================
// MethodRegistry
// ============================================================================

/// Maps methods to the schema of their payload.
#[derive(Debug, Clone, Default)]
pub struct MethodRegistry {
    types: FxHashMap<Method, &'static TypeDescriptor>,
}

impl MethodRegistry {
    /// Creates a registry with no methods.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a registry covering the full method catalog.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for method in Method::ALL {
            registry.register(*method, descriptor_for(*method));
        }
        registry
    }

    /// Registers (or replaces) the payload type of `method`.
    pub fn register(&mut self, method: Method, descriptor: &'static TypeDescriptor) {
        self.types.insert(method, descriptor);
    }

    /// Returns the payload type of `method`.
    #[inline]
    #[must_use]
    pub fn descriptor(&self, method: Method) -> Option<&'static TypeDescriptor> {
        self.types.get(&method).copied()
    }

    /// Returns `true` if `method` has a registered payload type.
    #[inline]
    #[must_use]
    pub fn contains(&self, method: Method) -> bool {
        self.types.contains_key(&method)
    }

    /// Number of registered methods.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if nothing is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Decodes a JSON-encoded payload for `method`.
    ///
    /// Unknown fields are kept. A missing payload yields an empty instance.
    /// A method without a registered type decodes into an untyped instance
    /// holding the payload verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the payload is not
    /// valid JSON.
    pub fn decode(&self, method: Method, payload: Option<&str>) -> Result<Instance> {
        let source: Value = match payload {
            Some(text) => serde_json::from_str(text)?,
            None => Value::Object(Default::default()),
        };
        Ok(self.decode_value(method, &source))
    }

    /// Decodes an already parsed payload for `method`.
    #[must_use]
    pub fn decode_value(&self, method: Method, source: &Value) -> Instance {
        let Some(descriptor) = self.descriptor(method) else {
            debug!(%method, "No payload type registered, decoding untyped");
            return opaque(source);
        };

        let mut instance = Instance::new(descriptor);
        if transfer(source, &mut instance, true).is_none() {
            return opaque(source);
        }
        instance
    }
}

fn opaque(source: &Value) -> Instance {
    let mut instance = Instance::untyped();
    transfer(source, &mut instance, true);
    instance
}

// ============================================================================
// Tests
// ============================================================================
