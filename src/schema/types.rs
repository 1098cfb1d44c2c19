//! Field descriptor definitions
//!
//! Supported kinds:
//! - string: UTF-8 string
//! - int: 64-bit integer
//! - float: any JSON number
//! - bool: Boolean
//! - email: string shaped like an email address
//! - raw: any JSON value, passed through untouched
//! - list: homogeneous list with an element descriptor
//! - nested: object governed by another declared type
//! - custom: externally supplied validator

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::model::TypeRecord;

use super::validator::Validator;

/// The rule a field applies to its raw input.
#[derive(Clone)]
pub enum FieldKind {
    String,
    Int,
    Float,
    Bool,
    Email,
    Raw,
    /// Homogeneous list; every element is checked against the boxed descriptor
    List(Box<FieldDescriptor>),
    /// Composed object validated by another type's compiled schema
    Nested(Arc<TypeRecord>),
    Custom(Arc<dyn Validator>),
}

impl FieldKind {
    /// Returns the kind name for error messages and introspection
    pub fn type_name(&self) -> &str {
        match self {
            FieldKind::String => "string",
            FieldKind::Int => "int",
            FieldKind::Float => "float",
            FieldKind::Bool => "bool",
            FieldKind::Email => "email",
            FieldKind::Raw => "raw",
            FieldKind::List(_) => "list",
            FieldKind::Nested(_) => "nested",
            FieldKind::Custom(validator) => validator.kind_name(),
        }
    }

    /// The nested type record, if this kind composes another type
    pub fn nested_record(&self) -> Option<&Arc<TypeRecord>> {
        match self {
            FieldKind::Nested(record) => Some(record),
            _ => None,
        }
    }
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::List(element) => f.debug_tuple("List").field(element).finish(),
            FieldKind::Nested(record) => f.debug_tuple("Nested").field(&record.name()).finish(),
            FieldKind::Custom(validator) => f.debug_tuple("Custom").field(validator).finish(),
            other => write!(f, "{}", other.type_name()),
        }
    }
}

/// Metadata for one named, typed, validated slot.
///
/// The name lives in the owning [`FieldMapping`]; a descriptor never changes
/// once it has been declared.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Validation rule
    pub kind: FieldKind,
    /// Whether construction input must supply the field
    pub required: bool,
    /// Whether an explicit null is accepted as a value
    pub allow_null: bool,
}

impl FieldDescriptor {
    /// Optional, non-nullable field of the given kind
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            allow_null: false,
        }
    }

    pub fn string() -> Self {
        Self::new(FieldKind::String)
    }

    pub fn int() -> Self {
        Self::new(FieldKind::Int)
    }

    pub fn float() -> Self {
        Self::new(FieldKind::Float)
    }

    pub fn boolean() -> Self {
        Self::new(FieldKind::Bool)
    }

    pub fn email() -> Self {
        Self::new(FieldKind::Email)
    }

    pub fn raw() -> Self {
        Self::new(FieldKind::Raw)
    }

    /// List whose elements follow `element`
    pub fn list(element: FieldDescriptor) -> Self {
        Self::new(FieldKind::List(Box::new(element)))
    }

    /// Object governed by `record`'s schema
    pub fn nested(record: &Arc<TypeRecord>) -> Self {
        Self::new(FieldKind::Nested(Arc::clone(record)))
    }

    pub fn custom(validator: Arc<dyn Validator>) -> Self {
        Self::new(FieldKind::Custom(validator))
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Accept an explicit null as a value
    pub fn nullable(mut self) -> Self {
        self.allow_null = true;
        self
    }

    /// An explicit null on an optional, non-nullable field reads as absent,
    /// so a dictionary produced by `asdict` loads back unchanged
    pub fn null_means_unset(&self) -> bool {
        !self.required && !self.allow_null
    }
}

/// Resolved field set of a type, keyed by field name.
///
/// Ordered by name so every dump and error report is deterministic.
pub type FieldMapping = BTreeMap<String, FieldDescriptor>;
