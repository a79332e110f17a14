//! Decoded message instances.
//!
//! An [`Instance`] is the strongly shaped form of a loosely typed JSON
//! payload: each field holds a [`FieldValue`] chosen by the type's schema.
//! Unknown fields, when kept, are stored verbatim as [`FieldValue::Raw`].

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::schema::{TypeDescriptor, UNTYPED};

// ============================================================================
// FieldValue
// ============================================================================

/// Value of one decoded field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Explicit `null` in the source.
    Null,
    /// Scalar copied as-is.
    Scalar(Value),
    /// Decoded array elements.
    Array(Vec<Instance>),
    /// Deep copy of an untyped nested object.
    Object(Value),
    /// Enum constant owned by the field's type descriptor.
    Constant(&'static str),
    /// Nested typed instance.
    Instance(Box<Instance>),
    /// Unknown or undecodable value kept verbatim.
    Raw(Value),
}

impl FieldValue {
    /// Returns the enum constant, if this field resolved to one.
    #[inline]
    #[must_use]
    pub fn as_constant(&self) -> Option<&'static str> {
        match self {
            Self::Constant(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the nested instance, if any.
    #[inline]
    #[must_use]
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Self::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    /// Returns the decoded array elements, if any.
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&[Instance]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the underlying JSON for scalar, object and raw values.
    #[inline]
    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Scalar(v) | Self::Object(v) | Self::Raw(v) => Some(v),
            _ => None,
        }
    }

    /// Converts back into loosely typed JSON.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Scalar(v) | Self::Object(v) | Self::Raw(v) => v.clone(),
            Self::Array(items) => Value::Array(items.iter().map(Instance::to_json).collect()),
            Self::Constant(c) => Value::String((*c).to_string()),
            Self::Instance(instance) => instance.to_json(),
        }
    }
}

// ============================================================================
// Instance
// ============================================================================

/// Value of a schema-described type.
#[derive(Debug, Clone)]
pub struct Instance {
    descriptor: &'static TypeDescriptor,
    fields: BTreeMap<String, FieldValue>,
    opaque: Option<Value>,
}

impl Instance {
    /// Creates an empty instance of `descriptor`.
    #[must_use]
    pub fn new(descriptor: &'static TypeDescriptor) -> Self {
        Self {
            descriptor,
            fields: BTreeMap::new(),
            opaque: None,
        }
    }

    /// Creates an empty untyped instance.
    #[must_use]
    pub fn untyped() -> Self {
        Self::new(&UNTYPED)
    }

    /// Type of this instance.
    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        self.descriptor
    }

    /// Field value by name.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Sets a field, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    /// Iterates decoded fields in key order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of decoded fields.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if nothing was decoded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.opaque.is_none()
    }

    /// Verbatim copy held by a schema-less instance.
    #[inline]
    #[must_use]
    pub fn opaque(&self) -> Option<&Value> {
        self.opaque.as_ref()
    }

    pub(crate) fn set_opaque(&mut self, value: Value) {
        self.opaque = Some(value);
    }

    pub(crate) fn into_opaque(self) -> Option<Value> {
        self.opaque
    }

    /// String field, when it holds a JSON string.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_value).and_then(Value::as_str)
    }

    /// Integer field, when it holds a JSON integer.
    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_value).and_then(Value::as_i64)
    }

    /// Boolean field, when it holds a JSON boolean.
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FieldValue::as_value).and_then(Value::as_bool)
    }

    /// Converts back into loosely typed JSON.
    ///
    /// A schema-less instance yields its verbatim copy (or `null`).
    #[must_use]
    pub fn to_json(&self) -> Value {
        if self.fields.is_empty()
            && let Some(opaque) = &self.opaque
        {
            return opaque.clone();
        }
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        if map.is_empty() && self.descriptor.schema().is_none() {
            return Value::Null;
        }
        Value::Object(map)
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.same(other.descriptor)
            && self.fields == other.fields
            && self.opaque == other.opaque
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::schema::Field;

    static POINT: TypeDescriptor =
        TypeDescriptor::structure("Point", &[Field::number("x"), Field::number("y")]);

    #[test]
    fn test_to_json_structure() {
        let mut point = Instance::new(&POINT);
        point.set("x", FieldValue::Scalar(json!(1)));
        point.set("y", FieldValue::Null);
        point.set("label", FieldValue::Raw(json!("origin")));

        assert_eq!(point.to_json(), json!({"x": 1, "y": null, "label": "origin"}));
        assert_eq!(point.get_i64("x"), Some(1));
        assert_eq!(point.get_str("label"), Some("origin"));
    }

    #[test]
    fn test_to_json_opaque() {
        let mut untyped = Instance::untyped();
        assert!(untyped.is_empty());
        assert_eq!(untyped.to_json(), Value::Null);

        untyped.set_opaque(json!({"a": [1, 2]}));
        assert_eq!(untyped.to_json(), json!({"a": [1, 2]}));
    }

    #[test]
    fn test_equality_uses_descriptor_identity() {
        let a = Instance::new(&POINT);
        let b = Instance::untyped();
        assert_ne!(a, b);
        assert_eq!(a, Instance::new(&POINT));
    }
}
