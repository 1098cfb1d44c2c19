//! Type declarations
//!
//! A declaration names a type, lists its bases in order, and carries the
//! field directives the type itself contributes: new or overriding fields,
//! and explicit removals of inherited ones.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::schema::{FieldDescriptor, FieldMapping, SchemaError, SchemaResult};

use super::record::TypeRecord;

/// One field-level directive in a declaration
#[derive(Debug, Clone)]
pub enum FieldDirective {
    /// Declare (or redeclare) a field
    Declare(String, FieldDescriptor),
    /// Remove an inherited field from this type and its subtypes
    Remove(String),
}

impl FieldDirective {
    pub fn name(&self) -> &str {
        match self {
            FieldDirective::Declare(name, _) | FieldDirective::Remove(name) => name,
        }
    }
}

/// Builder for a type declaration.
///
/// ```ignore
/// let human = registry.declare(
///     TypeDeclaration::new("Human")
///         .extends(&alien)
///         .field("name", FieldDescriptor::string())
///         .field("email", FieldDescriptor::email()),
/// )?;
/// ```
#[derive(Debug, Clone)]
pub struct TypeDeclaration {
    name: String,
    bases: Vec<Arc<TypeRecord>>,
    directives: Vec<FieldDirective>,
}

impl TypeDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            directives: Vec::new(),
        }
    }

    /// Add a base type; bases keep the order they are added in
    pub fn extends(mut self, base: &Arc<TypeRecord>) -> Self {
        self.bases.push(Arc::clone(base));
        self
    }

    pub fn field(mut self, name: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        self.directives
            .push(FieldDirective::Declare(name.into(), descriptor));
        self
    }

    /// Drop an inherited field from this type
    pub fn remove(mut self, name: impl Into<String>) -> Self {
        self.directives.push(FieldDirective::Remove(name.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bases(&self) -> &[Arc<TypeRecord>] {
        &self.bases
    }

    pub fn directives(&self) -> &[FieldDirective] {
        &self.directives
    }

    /// Declare without a registry, with strict removals.
    ///
    /// Runs the same aggregation and compilation as [`TypeRegistry::declare`](crate::model::TypeRegistry::declare)
    /// but neither logs nor checks name uniqueness.
    pub fn build(self) -> SchemaResult<Arc<TypeRecord>> {
        TypeRecord::declare(self, true).map(Arc::new)
    }

    pub(crate) fn into_parts(self) -> (String, Vec<Arc<TypeRecord>>, Vec<FieldDirective>) {
        (self.name, self.bases, self.directives)
    }
}

/// The fields one type contributes on its own, before inheritance.
#[derive(Debug)]
pub struct LocalFields {
    type_name: String,
    declared: FieldMapping,
    removed: BTreeSet<String>,
}

impl LocalFields {
    /// Split directives into declared and removed names.
    ///
    /// A name may appear in at most one directive per declaration.
    pub(crate) fn from_directives(
        type_name: &str,
        directives: Vec<FieldDirective>,
    ) -> SchemaResult<Self> {
        let mut seen: BTreeMap<String, &'static str> = BTreeMap::new();
        let mut declared = FieldMapping::new();
        let mut removed = BTreeSet::new();

        for directive in directives {
            let kind = match &directive {
                FieldDirective::Declare(..) => "declared",
                FieldDirective::Remove(_) => "removed",
            };
            if let Some(previous) = seen.insert(directive.name().to_string(), kind) {
                return Err(SchemaError::declaration_failed(format!(
                    "Field '{}' is both {} and {} in '{}'",
                    directive.name(),
                    previous,
                    kind,
                    type_name
                ))
                .with_type_name(type_name));
            }

            match directive {
                FieldDirective::Declare(name, descriptor) => {
                    declared.insert(name, descriptor);
                }
                FieldDirective::Remove(name) => {
                    removed.insert(name);
                }
            }
        }

        Ok(Self {
            type_name: type_name.to_string(),
            declared,
            removed,
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Fields this type declares itself
    pub fn declared(&self) -> &FieldMapping {
        &self.declared
    }

    /// Inherited names this type removes
    pub fn removed(&self) -> &BTreeSet<String> {
        &self.removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_order() {
        let decl = TypeDeclaration::new("Human")
            .field("name", FieldDescriptor::string())
            .remove("planet")
            .field("email", FieldDescriptor::email());

        let names: Vec<&str> = decl.directives().iter().map(FieldDirective::name).collect();
        assert_eq!(names, vec!["name", "planet", "email"]);
        assert!(decl.bases().is_empty());
    }

    #[test]
    fn test_local_fields_split() {
        let decl = TypeDeclaration::new("Human")
            .field("name", FieldDescriptor::string())
            .remove("planet");
        let (name, _, directives) = decl.into_parts();

        let local = LocalFields::from_directives(&name, directives).unwrap();
        assert!(local.declared().contains_key("name"));
        assert!(local.removed().contains("planet"));
        assert_eq!(local.type_name(), "Human");
    }

    #[test]
    fn test_declare_and_remove_same_name_rejected() {
        let decl = TypeDeclaration::new("Human")
            .field("planet", FieldDescriptor::string())
            .remove("planet");
        let (name, _, directives) = decl.into_parts();

        let err = LocalFields::from_directives(&name, directives).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.message().contains("planet"));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let decl = TypeDeclaration::new("Human")
            .field("name", FieldDescriptor::string())
            .field("name", FieldDescriptor::int());
        let (name, _, directives) = decl.into_parts();

        assert!(LocalFields::from_directives(&name, directives).is_err());
    }
}
