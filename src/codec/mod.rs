//! Message codec.
//!
//! Converts loosely typed JSON payloads into schema-described [`Instance`]s
//! and back. The codec tolerates drift between sender and schema: unknown
//! keys, scalar type mismatches and arrays sent as single values never fail
//! a decode.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `schema` | [`TypeDescriptor`], [`Field`] and [`FieldDescriptor`] |
//! | `instance` | Decoded values |
//! | `transfer` | The generic transform |
//! | `models` | Domain model schemas (payment, order, ...) |
//! | `messages` | One schema per method |
//! | `registry` | [`MethodRegistry`] |

// ============================================================================
// Submodules
// ============================================================================

/// Decoded message instances.
pub mod instance;

/// Per-method message schemas.
pub mod messages;

/// Domain model schemas.
pub mod models;

/// Method → payload type registry.
pub mod registry;

/// Schema descriptors.
pub mod schema;

/// Schema-driven transform.
pub mod transfer;

// ============================================================================
// Re-exports
// ============================================================================

pub use instance::{FieldValue, Instance};
pub use messages::descriptor_for;
pub use registry::MethodRegistry;
pub use schema::{Field, FieldDescriptor, ScalarKind, Schema, TypeDescriptor, UNTYPED};
pub use transfer::{ELEMENTS_KEY, RAW_SUFFIX, transfer};
