//! Schema error types
//!
//! Error codes:
//! - MALLOWS_UNKNOWN_FIELD (REJECT)
//! - MALLOWS_FIELD_VALIDATION_FAILED (REJECT)
//! - MALLOWS_UNKNOWN_ATTRIBUTE (REJECT)
//! - MALLOWS_DECLARATION_FAILED (FATAL)

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::validator::{SCHEMA_ERROR_KEY, UNKNOWN_FIELD};

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller input rejected, nothing was built
    Reject,
    /// Declaration is malformed, the type does not exist
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Construction input carried a key the type does not declare
    UnknownField,
    /// One or more declared fields failed their rule
    FieldValidationFailed,
    /// Read or write of a name that is not a field of the type
    UnknownAttribute,
    /// Aggregation or compilation failed at declaration time
    DeclarationFailed,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::UnknownField => "MALLOWS_UNKNOWN_FIELD",
            SchemaErrorCode::FieldValidationFailed => "MALLOWS_FIELD_VALIDATION_FAILED",
            SchemaErrorCode::UnknownAttribute => "MALLOWS_UNKNOWN_ATTRIBUTE",
            SchemaErrorCode::DeclarationFailed => "MALLOWS_DECLARATION_FAILED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::DeclarationFailed => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Field-keyed error tree.
///
/// Leaves carry human-readable messages. List elements are keyed by index,
/// nested objects by the nested field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldErrors {
    Messages(Vec<String>),
    Nested(BTreeMap<String, FieldErrors>),
}

impl FieldErrors {
    /// A single-message leaf
    pub fn message(msg: impl Into<String>) -> Self {
        FieldErrors::Messages(vec![msg.into()])
    }

    /// Messages at this node, if it is a leaf
    pub fn messages(&self) -> Option<&[String]> {
        match self {
            FieldErrors::Messages(msgs) => Some(msgs),
            FieldErrors::Nested(_) => None,
        }
    }

    /// Child node by key, if this is a nested node
    pub fn get(&self, key: &str) -> Option<&FieldErrors> {
        match self {
            FieldErrors::Messages(_) => None,
            FieldErrors::Nested(children) => children.get(key),
        }
    }

    /// Whether `msg` appears anywhere in this tree
    pub fn contains_message(&self, msg: &str) -> bool {
        match self {
            FieldErrors::Messages(msgs) => msgs.iter().any(|m| m == msg),
            FieldErrors::Nested(children) => children.values().any(|c| c.contains_message(msg)),
        }
    }

    /// Dotted paths of every leaf carrying `msg`, each under `prefix`
    pub fn paths_with_message(&self, prefix: &str, msg: &str) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_paths(prefix, msg, &mut out);
        out
    }

    fn collect_paths(&self, path: &str, msg: &str, out: &mut Vec<String>) {
        match self {
            FieldErrors::Messages(msgs) => {
                if msgs.iter().any(|m| m == msg) {
                    out.push(path.to_string());
                }
            }
            FieldErrors::Nested(children) => {
                for (key, child) in children {
                    child.collect_paths(&format!("{}.{}", path, key), msg, out);
                }
            }
        }
    }

    /// Merge `other` into this node; a leaf meeting a nested node moves
    /// under the `_schema` key
    fn merge(&mut self, other: FieldErrors) {
        match (self, other) {
            (FieldErrors::Messages(mine), FieldErrors::Messages(theirs)) => mine.extend(theirs),
            (FieldErrors::Nested(mine), FieldErrors::Nested(theirs)) => {
                for (key, node) in theirs {
                    merge_child(mine, key, node);
                }
            }
            (FieldErrors::Nested(mine), leaf) => merge_child(mine, SCHEMA_ERROR_KEY.to_string(), leaf),
            (slot, nested) => {
                let leaf = std::mem::replace(slot, nested);
                slot.merge(leaf);
            }
        }
    }
}

fn merge_child(children: &mut BTreeMap<String, FieldErrors>, key: String, node: FieldErrors) {
    match children.get_mut(&key) {
        Some(existing) => existing.merge(node),
        None => {
            children.insert(key, node);
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => write!(f, "{}", s),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}

/// All problems found while validating one input mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, FieldErrors>,
    unknown_fields: Vec<String>,
}

impl ValidationErrors {
    /// Empty error set
    pub fn new() -> Self {
        Self::default()
    }

    /// Error set holding a single field entry
    pub fn single(field: impl Into<String>, errors: FieldErrors) -> Self {
        let mut set = Self::new();
        set.add(field, errors);
        set
    }

    /// Record errors for a declared field
    pub fn add(&mut self, field: impl Into<String>, errors: FieldErrors) {
        let field = field.into();
        match self.errors.get_mut(&field) {
            Some(existing) => existing.merge(errors),
            None => {
                self.errors.insert(field, errors);
            }
        }
    }

    /// Record an input key that the schema does not declare
    pub fn add_unknown(&mut self, field: impl Into<String>) {
        let field = field.into();
        self.add(field.clone(), FieldErrors::message(UNKNOWN_FIELD));
        self.unknown_fields.push(field);
    }

    /// Record errors for a declared field, keeping any undeclared keys found
    /// inside its value (e.g. `singer.foo`)
    pub fn add_with_unknowns(&mut self, field: impl Into<String>, errors: FieldErrors) {
        let field = field.into();
        self.unknown_fields
            .extend(errors.paths_with_message(&field, UNKNOWN_FIELD));
        self.add(field, errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Undeclared input keys in input order; keys found inside nested values
    /// are dotted paths
    pub fn unknown_fields(&self) -> &[String] {
        &self.unknown_fields
    }

    pub fn has_unknown_fields(&self) -> bool {
        !self.unknown_fields.is_empty()
    }

    /// Errors for one field
    pub fn get(&self, field: &str) -> Option<&FieldErrors> {
        self.errors.get(field)
    }

    /// Field names that carry errors, sorted
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Collapse into a single nested tree keyed by field name
    pub fn into_tree(self) -> FieldErrors {
        FieldErrors::Nested(self.errors)
    }
}

/// Schema error type with full context
#[derive(Debug, Clone)]
pub struct SchemaError {
    /// Error code
    code: SchemaErrorCode,
    /// Human-readable message
    message: String,
    /// Declared type the error belongs to, if known
    type_name: Option<String>,
    /// Attribute name for unknown-attribute errors
    attribute: Option<String>,
    /// Field-keyed error tree for validation failures
    errors: Option<FieldErrors>,
}

impl SchemaError {
    /// Build the construction failure for a set of validation errors.
    ///
    /// Any undeclared key makes this an unknown-field error; the full tree
    /// (including rule failures on declared fields) is attached either way.
    pub fn from_validation(type_name: impl Into<String>, errors: ValidationErrors) -> Self {
        if errors.has_unknown_fields() {
            Self::unknown_field(type_name, errors)
        } else {
            Self::validation_failed(type_name, errors)
        }
    }

    /// Create an unknown field error
    pub fn unknown_field(type_name: impl Into<String>, errors: ValidationErrors) -> Self {
        let type_name = type_name.into();
        Self {
            code: SchemaErrorCode::UnknownField,
            message: format!(
                "Unknown field(s) for '{}': {}",
                type_name,
                errors.unknown_fields().join(", ")
            ),
            type_name: Some(type_name),
            attribute: None,
            errors: Some(errors.into_tree()),
        }
    }

    /// Create a field validation error
    pub fn validation_failed(type_name: impl Into<String>, errors: ValidationErrors) -> Self {
        let type_name = type_name.into();
        let fields: Vec<&str> = errors.field_names().collect();
        Self {
            code: SchemaErrorCode::FieldValidationFailed,
            message: format!(
                "Validation failed for '{}' on field(s): {}",
                type_name,
                fields.join(", ")
            ),
            type_name: Some(type_name),
            attribute: None,
            errors: Some(errors.into_tree()),
        }
    }

    /// Create an unknown attribute error
    pub fn unknown_attribute(type_name: impl Into<String>, attribute: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let attribute = attribute.into();
        Self {
            code: SchemaErrorCode::UnknownAttribute,
            message: format!("'{}' has no field '{}'", type_name, attribute),
            type_name: Some(type_name),
            attribute: Some(attribute),
            errors: None,
        }
    }

    /// Create a declaration error (FATAL)
    pub fn declaration_failed(reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::DeclarationFailed,
            message: reason.into(),
            type_name: None,
            attribute: None,
            errors: None,
        }
    }

    /// Create an error for a malformed declaration file
    pub fn malformed_declaration(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::declaration_failed(format!(
            "Malformed declaration file '{}': {}",
            path.into(),
            reason.into()
        ))
    }

    /// Attach the declared type name if the error does not carry one yet
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        if self.type_name.is_none() {
            self.type_name = Some(type_name.into());
        }
        self
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the type name if applicable
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Returns the offending attribute for unknown-attribute errors
    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    /// Returns the field-keyed error tree if applicable
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        self.errors.as_ref()
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)?;
        if let Some(ref errors) = self.errors {
            write!(f, " {}", errors)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
