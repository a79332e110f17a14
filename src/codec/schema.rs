//! Schema descriptors.
//!
//! A [`TypeDescriptor`] describes one message or model type: either a
//! structure (field name → [`FieldDescriptor`]), a named constant set, or
//! an opaque type with no schema at all. Descriptors are `'static` and
//! never mutated, so field descriptors point at other descriptors by
//! reference.
//!
//! ```ignore
//! static ITEM: TypeDescriptor =
//!     TypeDescriptor::structure("Item", &[Field::string("id")]);
//! static BASKET: TypeDescriptor =
//!     TypeDescriptor::structure("Basket", &[Field::array("items", &ITEM)]);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::ptr;

// ============================================================================
// ScalarKind
// ============================================================================

/// JSON scalar kinds. Informational only; values are never coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// JSON string.
    String,
    /// JSON number.
    Number,
    /// JSON boolean.
    Boolean,
}

// ============================================================================
// FieldDescriptor
// ============================================================================

/// How a single field is decoded.
#[derive(Debug, Clone, Copy)]
pub enum FieldDescriptor {
    /// Copied as-is.
    Scalar(ScalarKind),
    /// Array of instances of the element type. Accepts `{elements: [..]}`.
    ArrayOf(&'static TypeDescriptor),
    /// Untyped nested object, copied deeply with unknown fields kept.
    Object,
    /// Concrete type: an enum constant when the value names one, else a
    /// nested instance.
    Type(&'static TypeDescriptor),
}

// ============================================================================
// Field
// ============================================================================

/// Named field of a structure.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// JSON key.
    pub name: &'static str,
    /// Decoding rule.
    pub descriptor: FieldDescriptor,
}

impl Field {
    /// String scalar.
    #[must_use]
    pub const fn string(name: &'static str) -> Self {
        Self::new(name, FieldDescriptor::Scalar(ScalarKind::String))
    }

    /// Number scalar.
    #[must_use]
    pub const fn number(name: &'static str) -> Self {
        Self::new(name, FieldDescriptor::Scalar(ScalarKind::Number))
    }

    /// Boolean scalar.
    #[must_use]
    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldDescriptor::Scalar(ScalarKind::Boolean))
    }

    /// Array of `element`.
    #[must_use]
    pub const fn array(name: &'static str, element: &'static TypeDescriptor) -> Self {
        Self::new(name, FieldDescriptor::ArrayOf(element))
    }

    /// Untyped nested object.
    #[must_use]
    pub const fn object(name: &'static str) -> Self {
        Self::new(name, FieldDescriptor::Object)
    }

    /// Field of concrete type `ty`.
    #[must_use]
    pub const fn typed(name: &'static str, ty: &'static TypeDescriptor) -> Self {
        Self::new(name, FieldDescriptor::Type(ty))
    }

    const fn new(name: &'static str, descriptor: FieldDescriptor) -> Self {
        Self { name, descriptor }
    }
}

// ============================================================================
// Schema
// ============================================================================

/// Field table of a structure type.
#[derive(Clone, Copy)]
pub struct Schema {
    fields: &'static [Field],
}

impl Schema {
    /// Looks up the descriptor for `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<FieldDescriptor> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.descriptor)
    }

    /// Iterates the declared fields.
    pub fn fields(&self) -> impl Iterator<Item = &'static Field> {
        self.fields.iter()
    }

    /// Number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no fields are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.fields.iter().map(|field| field.name))
            .finish()
    }
}

// ============================================================================
// TypeDescriptor
// ============================================================================

/// Static description of a message or model type.
pub struct TypeDescriptor {
    name: &'static str,
    schema: Option<Schema>,
    constants: &'static [&'static str],
}

impl TypeDescriptor {
    /// Structure with the given fields.
    #[must_use]
    pub const fn structure(name: &'static str, fields: &'static [Field]) -> Self {
        Self {
            name,
            schema: Some(Schema { fields }),
            constants: &[],
        }
    }

    /// Named constant set.
    #[must_use]
    pub const fn enumeration(name: &'static str, constants: &'static [&'static str]) -> Self {
        Self {
            name,
            schema: None,
            constants,
        }
    }

    /// Type without a schema. Decoding copies the source verbatim when
    /// unknown data may be attached, and yields nothing otherwise.
    #[must_use]
    pub const fn opaque(name: &'static str) -> Self {
        Self {
            name,
            schema: None,
            constants: &[],
        }
    }

    /// Type name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Field table, if this is a structure.
    #[inline]
    #[must_use]
    pub const fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Declared constants (empty unless this is an enumeration).
    #[inline]
    #[must_use]
    pub const fn constants(&self) -> &'static [&'static str] {
        self.constants
    }

    /// Returns the declared constant equal to `value`.
    ///
    /// The returned reference points into the descriptor, so two lookups of
    /// the same constant are pointer-equal.
    #[must_use]
    pub fn constant(&self, value: &str) -> Option<&'static str> {
        self.constants.iter().copied().find(|c| *c == value)
    }

    /// Returns `true` if both references denote the same descriptor.
    #[inline]
    #[must_use]
    pub fn same(&self, other: &TypeDescriptor) -> bool {
        ptr::eq(self, other)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only the name: descriptors reference each other.
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("fields", &self.schema.map(|s| s.len()).unwrap_or(0))
            .field("constants", &self.constants.len())
            .finish()
    }
}

/// Descriptor used for untyped nested objects.
pub static UNTYPED: TypeDescriptor = TypeDescriptor::opaque("Object");

// ============================================================================
// Tests
// ============================================================================
