//! Schema-driven transform from loose JSON into typed instances.
//!
//! [`transfer`] walks the source object key by key and decodes each value
//! according to the target type's schema. It tolerates schema drift: a
//! mismatched scalar is copied without validation, an array field given a
//! non-array is logged and (optionally) stashed under an alternate key, and
//! unknown keys are either kept verbatim or dropped depending on
//! `attach_unknown`.

// ============================================================================
// Imports
// ============================================================================

use std::borrow::Cow;

use serde_json::Value;
use tracing::{trace, warn};

use super::instance::{FieldValue, Instance};
use super::schema::{FieldDescriptor, TypeDescriptor};
use crate::error::Error;

// ============================================================================
// Constants
// ============================================================================

/// Key of the wrapper object some senders put around arrays.
pub const ELEMENTS_KEY: &str = "elements";

/// Suffix of the key a non-array value is stashed under when an array was
/// declared.
pub const RAW_SUFFIX: &str = "_raw";

// ============================================================================
// transfer
// ============================================================================

/// Decodes `source` into `target`.
///
/// A string source is first parsed as JSON when possible. If the target
/// type has no schema, the source is kept verbatim when `attach_unknown` is
/// set and `None` is returned otherwise, signalling that nothing could be
/// attached. For a schema type the populated target is always returned.
pub fn transfer<'a>(
    source: &Value,
    target: &'a mut Instance,
    attach_unknown: bool,
) -> Option<&'a mut Instance> {
    let source = reparse(source);

    let Some(schema) = target.descriptor().schema().copied() else {
        if attach_unknown {
            target.set_opaque(source.into_owned());
            return Some(target);
        }
        return None;
    };

    let Value::Object(entries) = source.as_ref() else {
        trace!(
            type_name = target.descriptor().name(),
            "Non-object source for structure, nothing to copy"
        );
        return Some(target);
    };

    for (key, value) in entries {
        if value.is_null() {
            target.set(key.as_str(), FieldValue::Null);
            continue;
        }

        match schema.field(key) {
            None => {
                if attach_unknown {
                    target.set(key.as_str(), FieldValue::Raw(value.clone()));
                } else {
                    trace!(
                        type_name = target.descriptor().name(),
                        field = %key,
                        "Dropping unknown field"
                    );
                }
            }

            Some(FieldDescriptor::Scalar(_)) => {
                target.set(key.as_str(), FieldValue::Scalar(value.clone()));
            }

            Some(FieldDescriptor::ArrayOf(element)) => {
                transfer_array(key, value, element, target, attach_unknown);
            }

            Some(FieldDescriptor::Object) => {
                let mut nested = Instance::untyped();
                transfer(value, &mut nested, true);
                let copy = nested.into_opaque().unwrap_or(Value::Null);
                target.set(key.as_str(), FieldValue::Object(copy));
            }

            Some(FieldDescriptor::Type(ty)) => {
                if let Some(constant) = value.as_str().and_then(|s| ty.constant(s)) {
                    target.set(key.as_str(), FieldValue::Constant(constant));
                    continue;
                }

                let mut nested = Instance::new(ty);
                if transfer(value, &mut nested, attach_unknown).is_some() {
                    target.set(key.as_str(), FieldValue::Instance(Box::new(nested)));
                }
            }
        }
    }

    Some(target)
}

/// Decodes an `ArrayOf` field.
fn transfer_array(
    key: &str,
    value: &Value,
    element: &'static TypeDescriptor,
    target: &mut Instance,
    attach_unknown: bool,
) {
    let items = match value {
        Value::Object(wrapper) => wrapper.get(ELEMENTS_KEY).unwrap_or(value),
        _ => value,
    };

    match items {
        Value::Array(items) => {
            let decoded = items
                .iter()
                .map(|item| {
                    let mut instance = Instance::new(element);
                    transfer(item, &mut instance, attach_unknown);
                    instance
                })
                .collect();
            target.set(key, FieldValue::Array(decoded));
        }

        other => {
            let error = Error::codec(key, format!("expected an array of {}", element.name()));
            warn!(
                type_name = target.descriptor().name(),
                error = %error,
                "Keeping field untyped"
            );
            if attach_unknown {
                target.set(format!("{key}{RAW_SUFFIX}"), FieldValue::Raw(other.clone()));
            }
        }
    }
}

/// Parses a JSON-encoded string source; anything else is used as-is.
fn reparse(source: &Value) -> Cow<'_, Value> {
    match source {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed) => Cow::Owned(parsed),
            Err(_) => Cow::Borrowed(source),
        },
        _ => Cow::Borrowed(source),
    }
}

// ============================================================================
// Tests
// ============================================================================
