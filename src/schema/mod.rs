//! Schema subsystem
//!
//! Field descriptors, the validator collaborator contract, and the compiler
//! that turns a flat field mapping into an immutable [`Schema`].
//!
//! # Design Principles
//!
//! - Schemas are pure functions of their field mapping
//! - Unknown input keys are rejected
//! - Field errors are aggregated and keyed by field name
//! - Nested values are materialized instances, dumped recursively

mod compiler;
mod errors;
mod types;
mod validator;
mod value;

pub use compiler::Schema;
pub use errors::{
    FieldErrors, SchemaError, SchemaErrorCode, SchemaResult, Severity, ValidationErrors,
};
pub use types::{FieldDescriptor, FieldKind, FieldMapping};
pub use validator::{
    is_valid_email, Validator, INVALID_BOOLEAN, INVALID_EMAIL, INVALID_INPUT_TYPE,
    INVALID_INTEGER, INVALID_LIST, INVALID_NUMBER, INVALID_STRING, MISSING_REQUIRED,
    NULL_NOT_ALLOWED, SCHEMA_ERROR_KEY, UNKNOWN_FIELD,
};
pub use value::{FieldValue, LoadedData};
