//! Loaded field values

use serde_json::Value;
use std::collections::BTreeMap;

use crate::model::Instance;

/// A value that passed its field's rule.
///
/// Nested objects are held as materialized instances, never as raw input.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Scalar(Value),
    List(Vec<FieldValue>),
    Object(Instance),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(v) => v.as_str(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Scalar(v) => v.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Scalar(v) => v.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Scalar(v) => v.as_bool(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            FieldValue::Object(instance) => Some(instance),
            _ => None,
        }
    }

    /// True for an explicit null accepted by a nullable field
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Scalar(Value::Null))
    }

    /// Plain JSON form, used when no descriptor is at hand
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Scalar(v) => v.clone(),
            FieldValue::List(items) => Value::Array(items.iter().map(FieldValue::to_json).collect()),
            FieldValue::Object(instance) => Value::Object(instance.asdict()),
        }
    }
}

/// Fields supplied and validated during one construction call.
///
/// Absent optional fields are not present here.
pub type LoadedData = BTreeMap<String, FieldValue>;
