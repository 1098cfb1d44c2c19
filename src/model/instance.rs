//! Instances: materialization, attribute access, and serialization
//!
//! After construction an instance holds exactly one slot per declared
//! field: either a loaded value or `Unset`. Reading a name outside the
//! field mapping is an error, never a silent null.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::observability::{trace_event, Event};
use crate::schema::{
    FieldErrors, FieldValue, SchemaError, SchemaResult, ValidationErrors, MISSING_REQUIRED,
};

use super::record::TypeRecord;

/// One declared field's state on an instance
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Set(FieldValue),
    /// Declared but not supplied
    Unset,
}

impl Slot {
    pub fn is_set(&self) -> bool {
        matches!(self, Slot::Set(_))
    }

    pub fn value(&self) -> Option<&FieldValue> {
        match self {
            Slot::Set(value) => Some(value),
            Slot::Unset => None,
        }
    }
}

/// An object of a declared type.
#[derive(Clone)]
pub struct Instance {
    record: Arc<TypeRecord>,
    data: BTreeMap<String, Slot>,
}

impl Instance {
    pub(crate) fn materialize(record: &Arc<TypeRecord>, raw: &Map<String, Value>) -> SchemaResult<Self> {
        let mut loaded = match record.schema().validate_and_load(raw) {
            Ok(loaded) => loaded,
            Err(errors) => {
                let err = SchemaError::from_validation(record.name(), errors);
                trace_event(
                    Event::InstanceRejected,
                    &[("type", record.name()), ("code", err.code().code())],
                );
                return Err(err);
            }
        };

        let data: BTreeMap<String, Slot> = record
            .field_names()
            .map(|name| {
                let slot = match loaded.remove(name) {
                    Some(value) => Slot::Set(value),
                    None => Slot::Unset,
                };
                (name.to_string(), slot)
            })
            .collect();

        trace_event(Event::InstanceConstructed, &[("type", record.name())]);

        Ok(Self {
            record: Arc::clone(record),
            data,
        })
    }

    /// Tagged read of a declared field.
    ///
    /// # Errors
    ///
    /// Returns an unknown-attribute error if `name` is not a field of this type.
    pub fn get(&self, name: &str) -> SchemaResult<&Slot> {
        self.data
            .get(name)
            .ok_or_else(|| SchemaError::unknown_attribute(self.record.name(), name))
    }

    /// Read a declared field; `None` means declared but unset
    pub fn value(&self, name: &str) -> SchemaResult<Option<&FieldValue>> {
        self.get(name).map(Slot::value)
    }

    pub fn is_set(&self, name: &str) -> SchemaResult<bool> {
        self.get(name).map(Slot::is_set)
    }

    /// Validate and store a new value for one field.
    ///
    /// Only this instance changes; the shared schema is untouched.
    pub fn set(&mut self, name: &str, raw: &Value) -> SchemaResult<()> {
        let descriptor = self
            .record
            .schema()
            .field(name)
            .ok_or_else(|| SchemaError::unknown_attribute(self.record.name(), name))?;

        if raw.is_null() && descriptor.null_means_unset() {
            self.data.insert(name.to_string(), Slot::Unset);
            return Ok(());
        }

        let value = descriptor.load(raw).map_err(|e| {
            let mut errors = ValidationErrors::new();
            errors.add_with_unknowns(name, e);
            SchemaError::from_validation(self.record.name(), errors)
        })?;

        self.data.insert(name.to_string(), Slot::Set(value));
        Ok(())
    }

    /// Clear an optional field back to `Unset`
    pub fn unset(&mut self, name: &str) -> SchemaResult<()> {
        let descriptor = self
            .record
            .schema()
            .field(name)
            .ok_or_else(|| SchemaError::unknown_attribute(self.record.name(), name))?;

        if descriptor.required {
            return Err(SchemaError::validation_failed(
                self.record.name(),
                ValidationErrors::single(name, FieldErrors::message(MISSING_REQUIRED)),
            ));
        }

        self.data.insert(name.to_string(), Slot::Unset);
        Ok(())
    }

    /// Complete dictionary form.
    ///
    /// Every declared field is a key; unset fields are null, nested
    /// instances are flattened through their own `asdict`.
    pub fn asdict(&self) -> Map<String, Value> {
        self.data
            .iter()
            .map(|(name, slot)| {
                let value = match slot {
                    Slot::Set(value) => self.record.schema().dump_field(name, value),
                    Slot::Unset => Value::Null,
                };
                (name.clone(), value)
            })
            .collect()
    }

    pub fn type_name(&self) -> &str {
        self.record.name()
    }

    /// The shared type record
    pub fn record(&self) -> &Arc<TypeRecord> {
        &self.record
    }

    /// Slots in field-name order
    pub fn slots(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.data.iter().map(|(name, slot)| (name.as_str(), slot))
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.record.name() == other.record.name() && self.data == other.data
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.record.name())
            .field("data", &self.data)
            .finish()
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.asdict().serialize(serializer)
    }
}
