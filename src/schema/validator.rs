//! Field-level validation rules
//!
//! Rules are strict:
//! - No implicit type coercion (an int field rejects "42")
//! - Nulls only where the descriptor allows them
//! - Nested objects are materialized through the nested type's schema
//! - List elements are checked one by one, errors keyed by index

use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use super::errors::FieldErrors;
use super::types::{FieldDescriptor, FieldKind};
use super::value::FieldValue;

pub const UNKNOWN_FIELD: &str = "Unknown field.";
pub const MISSING_REQUIRED: &str = "Missing data for required field.";
pub const NULL_NOT_ALLOWED: &str = "Field may not be null.";
pub const INVALID_STRING: &str = "Not a valid string.";
pub const INVALID_INTEGER: &str = "Not a valid integer.";
pub const INVALID_NUMBER: &str = "Not a valid number.";
pub const INVALID_BOOLEAN: &str = "Not a valid boolean.";
pub const INVALID_EMAIL: &str = "Not a valid email address.";
pub const INVALID_LIST: &str = "Not a valid list.";
pub const INVALID_INPUT_TYPE: &str = "Invalid input type.";

/// Key for errors that concern the input as a whole rather than one field
pub const SCHEMA_ERROR_KEY: &str = "_schema";

/// Collaborator contract for a single field rule.
///
/// The schema never looks inside a validator; it only uses the pass/fail
/// outcome of `load` and the converted value.
pub trait Validator: Send + Sync + fmt::Debug {
    /// Short name used in introspection output
    fn kind_name(&self) -> &str;

    /// Check and convert one raw value
    fn load(&self, raw: &Value) -> Result<FieldValue, FieldErrors>;

    /// Turn a loaded value back into plain JSON
    fn dump(&self, value: &FieldValue) -> Value;
}

fn email_pattern() -> &'static Regex {
    static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();
    EMAIL_PATTERN.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@(?:localhost|[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+)$",
        )
        .expect("email pattern is a valid regex")
    })
}

/// Whether `s` is shaped like an email address
pub fn is_valid_email(s: &str) -> bool {
    email_pattern().is_match(s)
}

impl Validator for FieldKind {
    fn kind_name(&self) -> &str {
        self.type_name()
    }

    fn load(&self, raw: &Value) -> Result<FieldValue, FieldErrors> {
        match self {
            FieldKind::String => match raw {
                Value::String(_) => Ok(FieldValue::Scalar(raw.clone())),
                _ => Err(FieldErrors::message(INVALID_STRING)),
            },
            FieldKind::Int => {
                // Floats are rejected even when they have no fractional part,
                // and so is anything outside the i64 range
                if raw.is_i64() {
                    Ok(FieldValue::Scalar(raw.clone()))
                } else {
                    Err(FieldErrors::message(INVALID_INTEGER))
                }
            }
            FieldKind::Float => {
                if raw.is_number() {
                    Ok(FieldValue::Scalar(raw.clone()))
                } else {
                    Err(FieldErrors::message(INVALID_NUMBER))
                }
            }
            FieldKind::Bool => match raw {
                Value::Bool(_) => Ok(FieldValue::Scalar(raw.clone())),
                _ => Err(FieldErrors::message(INVALID_BOOLEAN)),
            },
            FieldKind::Email => match raw.as_str() {
                Some(s) if is_valid_email(s) => Ok(FieldValue::Scalar(raw.clone())),
                _ => Err(FieldErrors::message(INVALID_EMAIL)),
            },
            FieldKind::Raw => Ok(FieldValue::Scalar(raw.clone())),
            FieldKind::List(element) => {
                let items = raw
                    .as_array()
                    .ok_or_else(|| FieldErrors::message(INVALID_LIST))?;

                let mut loaded = Vec::with_capacity(items.len());
                let mut errors = BTreeMap::new();
                for (i, item) in items.iter().enumerate() {
                    match element.load(item) {
                        Ok(value) => loaded.push(value),
                        Err(e) => {
                            errors.insert(i.to_string(), e);
                        }
                    }
                }

                if errors.is_empty() {
                    Ok(FieldValue::List(loaded))
                } else {
                    Err(FieldErrors::Nested(errors))
                }
            }
            FieldKind::Nested(record) => {
                let obj = raw.as_object().ok_or_else(|| {
                    let mut errors = BTreeMap::new();
                    errors.insert(
                        SCHEMA_ERROR_KEY.to_string(),
                        FieldErrors::message(INVALID_INPUT_TYPE),
                    );
                    FieldErrors::Nested(errors)
                })?;

                record.construct(obj).map(FieldValue::Object).map_err(|e| {
                    e.field_errors()
                        .cloned()
                        .unwrap_or_else(|| FieldErrors::message(e.message()))
                })
            }
            FieldKind::Custom(validator) => validator.load(raw),
        }
    }

    fn dump(&self, value: &FieldValue) -> Value {
        match (self, value) {
            (FieldKind::List(element), FieldValue::List(items)) => {
                Value::Array(items.iter().map(|item| element.dump(item)).collect())
            }
            (FieldKind::Nested(_), FieldValue::Object(instance)) => Value::Object(instance.asdict()),
            (FieldKind::Custom(validator), value) => validator.dump(value),
            (_, value) => value.to_json(),
        }
    }
}

impl FieldDescriptor {
    /// Apply the null policy, then the kind's rule
    pub fn load(&self, raw: &Value) -> Result<FieldValue, FieldErrors> {
        if raw.is_null() {
            return if self.allow_null {
                Ok(FieldValue::Scalar(Value::Null))
            } else {
                Err(FieldErrors::message(NULL_NOT_ALLOWED))
            };
        }
        self.kind.load(raw)
    }

    pub fn dump(&self, value: &FieldValue) -> Value {
        if value.is_null() {
            return Value::Null;
        }
        self.kind.dump(value)
    }
}
