//! Type records
//!
//! A type record is built exactly once per declared type and never changes
//! afterwards. Every instance of the type shares it through an `Arc`; a
//! subtype gets its own record built by re-aggregating, not a live link.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::schema::{
    FieldErrors, FieldMapping, Schema, SchemaError, SchemaResult, ValidationErrors,
    INVALID_INPUT_TYPE, SCHEMA_ERROR_KEY,
};

use super::aggregator::{aggregate, linearize};
use super::declaration::{LocalFields, TypeDeclaration};
use super::instance::Instance;

/// Per-type field mapping and compiled schema.
pub struct TypeRecord {
    name: String,
    local: Arc<LocalFields>,
    /// Linearized ancestry, this type first
    ancestry: Vec<Arc<LocalFields>>,
    base_names: Vec<String>,
    schema: Schema,
}

impl TypeRecord {
    /// Aggregate and compile a declaration.
    ///
    /// # Errors
    ///
    /// Returns a declaration error (FATAL) if the name is empty, the field
    /// directives conflict, the bases cannot be linearized, a strict removal
    /// names an unknown field, or the merged mapping does not compile.
    pub(crate) fn declare(declaration: TypeDeclaration, strict_removals: bool) -> SchemaResult<Self> {
        let (name, bases, directives) = declaration.into_parts();
        if name.trim().is_empty() {
            return Err(SchemaError::declaration_failed("Type name must not be empty"));
        }

        let local = Arc::new(LocalFields::from_directives(&name, directives)?);
        let ancestry = linearize(&local, &bases)?;
        let fields = aggregate(&ancestry, strict_removals)?;
        let schema = Schema::compile(&fields).map_err(|e| e.with_type_name(&name))?;

        Ok(Self {
            base_names: bases.iter().map(|b| b.name.clone()).collect(),
            name,
            local,
            ancestry,
            schema,
        })
    }

    /// Validate keyword input and materialize an instance.
    ///
    /// Fails atomically: on error no instance exists.
    pub fn construct(self: &Arc<Self>, raw: &Map<String, Value>) -> SchemaResult<Instance> {
        Instance::materialize(self, raw)
    }

    /// Like [`construct`](Self::construct), for input that may not be an object
    pub fn construct_value(self: &Arc<Self>, raw: &Value) -> SchemaResult<Instance> {
        match raw.as_object() {
            Some(obj) => self.construct(obj),
            None => Err(SchemaError::validation_failed(
                self.name.clone(),
                ValidationErrors::single(SCHEMA_ERROR_KEY, FieldErrors::message(INVALID_INPUT_TYPE)),
            )),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The compiled schema shared by every instance of this type
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The aggregated field mapping
    pub fn fields(&self) -> &FieldMapping {
        self.schema.fields()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.schema.field_names()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.schema.field(name).is_some()
    }

    /// Names of the direct bases, in declaration order
    pub fn base_names(&self) -> &[String] {
        &self.base_names
    }

    /// Linearized ancestry names, this type first
    pub fn ancestry_names(&self) -> Vec<&str> {
        self.ancestry.iter().map(|l| l.type_name()).collect()
    }

    /// Whether `other` appears in this type's ancestry (including itself)
    pub fn is_subtype_of(&self, other: &TypeRecord) -> bool {
        self.ancestry.iter().any(|l| Arc::ptr_eq(l, &other.local))
    }

    /// Field names this type declares or removes itself
    pub fn local_directives(&self) -> BTreeMap<&str, bool> {
        let mut directives = BTreeMap::new();
        for name in self.local.declared().keys() {
            directives.insert(name.as_str(), true);
        }
        for name in self.local.removed() {
            directives.insert(name.as_str(), false);
        }
        directives
    }

    pub(crate) fn local(&self) -> &Arc<LocalFields> {
        &self.local
    }

    pub(crate) fn ancestry(&self) -> &[Arc<LocalFields>] {
        &self.ancestry
    }
}

impl fmt::Debug for TypeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRecord")
            .field("name", &self.name)
            .field("bases", &self.base_names)
            .field("fields", &self.schema.field_names().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDescriptor, SchemaErrorCode};
    use serde_json::json;

    #[test]
    fn test_declare_compiles_schema() {
        let record = TypeDeclaration::new("Person")
            .field("name", FieldDescriptor::string())
            .field("email", FieldDescriptor::email())
            .build()
            .unwrap();

        assert_eq!(record.name(), "Person");
        assert_eq!(record.field_names().collect::<Vec<_>>(), vec!["email", "name"]);
        assert!(record.has_field("email"));
        assert!(!record.has_field("album"));
    }

    #[test]
    fn test_empty_type_name_rejected() {
        let err = TypeDeclaration::new("  ").build().unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::DeclarationFailed);
    }

    #[test]
    fn test_subtype_relation() {
        let base = TypeDeclaration::new("KardeshevBeing")
            .field("level", FieldDescriptor::int())
            .build()
            .unwrap();
        let alien = TypeDeclaration::new("Alien")
            .extends(&base)
            .field("planet", FieldDescriptor::string())
            .build()
            .unwrap();

        assert!(alien.is_subtype_of(&base));
        assert!(alien.is_subtype_of(&alien));
        assert!(!base.is_subtype_of(&alien));
        assert_eq!(alien.ancestry_names(), vec!["Alien", "KardeshevBeing"]);
        assert_eq!(alien.base_names(), &["KardeshevBeing".to_string()]);
    }

    #[test]
    fn test_local_directives() {
        let base = TypeDeclaration::new("Base")
            .field("level", FieldDescriptor::int())
            .field("planet", FieldDescriptor::string())
            .build()
            .unwrap();
        let derived = TypeDeclaration::new("Derived")
            .extends(&base)
            .field("name", FieldDescriptor::string())
            .remove("planet")
            .build()
            .unwrap();

        let directives = derived.local_directives();
        assert_eq!(directives.get("name"), Some(&true));
        assert_eq!(directives.get("planet"), Some(&false));
        assert!(directives.get("level").is_none());
    }

    #[test]
    fn test_construct_value_rejects_non_object() {
        let record = TypeDeclaration::new("Person")
            .field("name", FieldDescriptor::string())
            .build()
            .unwrap();

        let err = record.construct_value(&json!(["not", "an", "object"])).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::FieldValidationFailed);
        assert!(err
            .field_errors()
            .unwrap()
            .get(SCHEMA_ERROR_KEY)
            .unwrap()
            .contains_message(INVALID_INPUT_TYPE));
    }
}
