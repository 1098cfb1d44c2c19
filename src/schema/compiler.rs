//! Schema compilation and the validate/load/dump round trip
//!
//! A compiled schema is a pure function of its field mapping:
//! - Undeclared input keys are errors, never silently dropped
//! - Every field error is collected before failing
//! - Dumping recurses into lists and nested instances

use serde_json::{Map, Value};

use super::errors::{FieldErrors, SchemaError, SchemaResult, ValidationErrors};
use super::types::{FieldDescriptor, FieldKind, FieldMapping};
use super::validator::{MISSING_REQUIRED, SCHEMA_ERROR_KEY};
use super::value::{FieldValue, LoadedData};

/// Immutable validator/serializer derived from a field mapping.
///
/// Holds no mutable state, so one schema can serve concurrent
/// constructions from any number of threads.
#[derive(Debug, Clone)]
pub struct Schema {
    fields: FieldMapping,
}

impl Schema {
    /// Compile a field mapping.
    ///
    /// # Errors
    ///
    /// Returns a declaration error if a field name is empty or reserved, or if
    /// a list element rule is marked required.
    pub fn compile(fields: &FieldMapping) -> SchemaResult<Self> {
        for (name, descriptor) in fields {
            check_field_name(name)?;
            check_descriptor(name, descriptor)?;
        }

        Ok(Self {
            fields: fields.clone(),
        })
    }

    /// Validate raw input and convert every supplied field.
    ///
    /// The result only contains keys that were present in `raw`.
    pub fn validate_and_load(&self, raw: &Map<String, Value>) -> Result<LoadedData, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut data = LoadedData::new();

        for key in raw.keys() {
            if !self.fields.contains_key(key) {
                errors.add_unknown(key.as_str());
            }
        }

        for (name, descriptor) in &self.fields {
            match raw.get(name) {
                Some(value) if value.is_null() && descriptor.null_means_unset() => {}
                Some(value) => match descriptor.load(value) {
                    Ok(loaded) => {
                        data.insert(name.clone(), loaded);
                    }
                    Err(e) => errors.add_with_unknowns(name.as_str(), e),
                },
                None if descriptor.required => {
                    errors.add(name.as_str(), FieldErrors::message(MISSING_REQUIRED));
                }
                None => {}
            }
        }

        if errors.is_empty() {
            Ok(data)
        } else {
            Err(errors)
        }
    }

    /// Dump loaded data back to plain JSON, key for key
    pub fn dump(&self, data: &LoadedData) -> Map<String, Value> {
        data.iter()
            .map(|(name, value)| (name.clone(), self.dump_field(name, value)))
            .collect()
    }

    /// Dump one value through its field's descriptor
    pub fn dump_field(&self, name: &str, value: &FieldValue) -> Value {
        match self.fields.get(name) {
            Some(descriptor) => descriptor.dump(value),
            None => value.to_json(),
        }
    }

    /// The field mapping this schema was compiled from
    pub fn fields(&self) -> &FieldMapping {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    /// Declared field names, sorted
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn check_field_name(name: &str) -> SchemaResult<()> {
    if name.is_empty() {
        return Err(SchemaError::declaration_failed("Field name must not be empty"));
    }
    if name == SCHEMA_ERROR_KEY {
        return Err(SchemaError::declaration_failed(format!(
            "Field name '{}' is reserved",
            SCHEMA_ERROR_KEY
        )));
    }
    Ok(())
}

fn check_descriptor(name: &str, descriptor: &FieldDescriptor) -> SchemaResult<()> {
    if let FieldKind::List(element) = &descriptor.kind {
        if element.required {
            return Err(SchemaError::declaration_failed(format!(
                "List element rule of field '{}' cannot be required",
                name
            )));
        }
        check_descriptor(name, element)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validator::{INVALID_EMAIL, INVALID_INTEGER, NULL_NOT_ALLOWED, UNKNOWN_FIELD};
    use serde_json::json;

    fn human_fields() -> FieldMapping {
        let mut fields = FieldMapping::new();
        fields.insert("name".into(), FieldDescriptor::string().required());
        fields.insert("email".into(), FieldDescriptor::email());
        fields.insert("level".into(), FieldDescriptor::int());
        fields
    }

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_load_only_supplied_fields() {
        let schema = Schema::compile(&human_fields()).unwrap();
        let data = schema.validate_and_load(&obj(json!({"name": "Lady Gaga"}))).unwrap();

        assert_eq!(data.len(), 1);
        assert_eq!(data["name"].as_str(), Some("Lady Gaga"));
        assert!(!data.contains_key("email"));
    }

    #[test]
    fn test_null_policy() {
        let mut fields = human_fields();
        fields.insert("nickname".into(), FieldDescriptor::string().nullable());
        let schema = Schema::compile(&fields).unwrap();

        let data = schema
            .validate_and_load(&obj(json!({"name": "Lady Gaga", "email": null, "nickname": null})))
            .unwrap();
        assert!(!data.contains_key("email"));
        assert!(data["nickname"].is_null());

        let errors = schema.validate_and_load(&obj(json!({"name": null}))).unwrap_err();
        assert!(errors.get("name").unwrap().contains_message(NULL_NOT_ALLOWED));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let schema = Schema::compile(&human_fields()).unwrap();
        let errors = schema
            .validate_and_load(&obj(json!({"name": "Taylor", "foo": "Foo"})))
            .unwrap_err();

        assert_eq!(errors.unknown_fields(), &["foo".to_string()]);
        assert!(errors.get("foo").unwrap().contains_message(UNKNOWN_FIELD));
    }

    #[test]
    fn test_all_errors_aggregated() {
        let schema = Schema::compile(&human_fields()).unwrap();
        let errors = schema
            .validate_and_load(&obj(json!({"email": "nope", "level": "high", "foo": 1})))
            .unwrap_err();

        assert_eq!(errors.len(), 4);
        assert!(errors.get("email").unwrap().contains_message(INVALID_EMAIL));
        assert!(errors.get("level").unwrap().contains_message(INVALID_INTEGER));
        assert!(errors.get("name").unwrap().contains_message(MISSING_REQUIRED));
        assert!(errors.get("foo").is_some());
    }

    #[test]
    fn test_dump_is_identity_for_scalars() {
        let schema = Schema::compile(&human_fields()).unwrap();
        let raw = obj(json!({"name": "Nicki Minaj", "level": 2}));
        let data = schema.validate_and_load(&raw).unwrap();

        assert_eq!(schema.dump(&data), raw);
    }

    #[test]
    fn test_compile_is_deterministic() {
        let first = Schema::compile(&human_fields()).unwrap();
        let second = Schema::compile(&human_fields()).unwrap();

        let inputs = [
            json!({"name": "a"}),
            json!({"name": "a", "email": "a@b.co"}),
            json!({"email": "broken"}),
            json!({"name": "a", "extra": true}),
            json!({"name": 3, "level": 1.5}),
        ];
        for input in inputs {
            let raw = obj(input);
            assert_eq!(
                first.validate_and_load(&raw).is_ok(),
                second.validate_and_load(&raw).is_ok()
            );
            assert_eq!(
                first.validate_and_load(&raw).err(),
                second.validate_and_load(&raw).err()
            );
        }
    }

    #[test]
    fn test_reserved_and_empty_names_rejected() {
        let mut fields = FieldMapping::new();
        fields.insert("_schema".into(), FieldDescriptor::string());
        assert!(Schema::compile(&fields).unwrap_err().is_fatal());

        let mut fields = FieldMapping::new();
        fields.insert(String::new(), FieldDescriptor::string());
        assert!(Schema::compile(&fields).is_err());
    }

    #[test]
    fn test_required_list_element_rejected() {
        let mut fields = FieldMapping::new();
        fields.insert(
            "songs".into(),
            FieldDescriptor::list(FieldDescriptor::list(FieldDescriptor::string().required())),
        );
        let err = Schema::compile(&fields).unwrap_err();
        assert!(err.message().contains("songs"));
    }

    #[test]
    fn test_empty_schema() {
        let schema = Schema::compile(&FieldMapping::new()).unwrap();
        assert!(schema.is_empty());
        assert!(schema.validate_and_load(&Map::new()).unwrap().is_empty());
    }
}
