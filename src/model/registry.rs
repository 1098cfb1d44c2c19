//! Type registry
//!
//! The registrar: each declaration passes through here exactly once. The
//! registry aggregates the field mapping, compiles the schema, and keeps the
//! resulting record under its name. Registered records are write-once.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::Config;
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{SchemaError, SchemaResult};

use super::declaration::TypeDeclaration;
use super::record::TypeRecord;

/// Registry of declared types, indexed by name.
///
/// Cloning is cheap: records are shared, not copied.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: BTreeMap<String, Arc<TypeRecord>>,
    strict_removals: bool,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Empty registry with strict removals
    pub fn new() -> Self {
        Self {
            types: BTreeMap::new(),
            strict_removals: true,
        }
    }

    /// Empty registry with behavior taken from `config`
    pub fn from_config(config: &Config) -> Self {
        Self {
            types: BTreeMap::new(),
            strict_removals: config.strict_removals,
        }
    }

    /// Whether removing a field no ancestor declares is rejected
    pub fn strict_removals(&self) -> bool {
        self.strict_removals
    }

    /// Declare a type.
    ///
    /// # Errors
    ///
    /// Returns a declaration error (FATAL) if a type with the same name is
    /// already registered or if aggregation or compilation fails. A failed
    /// declaration leaves the registry unchanged.
    pub fn declare(&mut self, declaration: TypeDeclaration) -> SchemaResult<Arc<TypeRecord>> {
        let name = declaration.name().to_string();

        match self.build(declaration) {
            Ok(record) => {
                let field_count = record.fields().len().to_string();
                let bases = record.base_names().join(",");
                log_event_with_fields(
                    Event::TypeDeclared,
                    &[
                        ("type", name.as_str()),
                        ("fields", field_count.as_str()),
                        ("bases", bases.as_str()),
                    ],
                );
                self.types.insert(name, Arc::clone(&record));
                Ok(record)
            }
            Err(e) => {
                log_event_with_fields(
                    Event::DeclarationRejected,
                    &[("type", name.as_str()), ("reason", e.message())],
                );
                Err(e)
            }
        }
    }

    fn build(&self, declaration: TypeDeclaration) -> SchemaResult<Arc<TypeRecord>> {
        if self.types.contains_key(declaration.name()) {
            return Err(SchemaError::declaration_failed(format!(
                "Type '{}' is already declared",
                declaration.name()
            ))
            .with_type_name(declaration.name()));
        }

        TypeRecord::declare(declaration, self.strict_removals).map(Arc::new)
    }

    /// Gets a record by type name
    pub fn get(&self, name: &str) -> Option<&Arc<TypeRecord>> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered type names, sorted
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn records(&self) -> impl Iterator<Item = &Arc<TypeRecord>> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
