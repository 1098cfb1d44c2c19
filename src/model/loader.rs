//! Declaration loader for reading type declarations from disk
//!
//! - Every `*.json` file in the schema directory holds one declaration or an
//!   array of them
//! - Types are declared in dependency order: bases and nested references
//!   before the types that use them
//! - Malformed files, unknown references, and cycles are declaration errors

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::observability::ObservationScope;
use crate::schema::{FieldDescriptor, SchemaError, SchemaResult};

use super::declaration::TypeDeclaration;
use super::manifest::{DeclarationFile, DeclarationManifest, FieldKindManifest, FieldManifest};
use super::record::TypeRecord;
use super::registry::TypeRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Loader that reads declaration files and feeds them to a registry.
#[derive(Debug)]
pub struct DeclarationLoader {
    schema_dir: PathBuf,
    manifests: BTreeMap<String, DeclarationManifest>,
    /// Where each manifest came from, for error messages
    sources: BTreeMap<String, String>,
}

impl DeclarationLoader {
    pub fn new(schema_dir: &Path) -> Self {
        Self {
            schema_dir: schema_dir.to_path_buf(),
            manifests: BTreeMap::new(),
            sources: BTreeMap::new(),
        }
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Number of declarations read so far
    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }

    /// Read every declaration file in the schema directory, then declare
    /// all of them into `registry`.
    ///
    /// Returns the records in declaration order.
    pub fn load_all(&mut self, registry: &mut TypeRegistry) -> SchemaResult<Vec<Arc<TypeRecord>>> {
        let dir = self.schema_dir.display().to_string();
        let scope = ObservationScope::with_fields("DECLARATIONS_LOAD", &[("dir", dir.as_str())]);

        let result = self.read_dir().and_then(|_| self.declare_into(registry));

        match &result {
            Ok(records) => {
                let count = records.len().to_string();
                scope.complete_with_fields(&[("types", count.as_str())]);
            }
            Err(e) => scope.fail(e.message()),
        }

        result
    }

    /// Read all `*.json` files in the schema directory, in path order.
    pub fn read_dir(&mut self) -> SchemaResult<()> {
        let dir = self.schema_dir.display().to_string();

        if !self.schema_dir.is_dir() {
            return Err(SchemaError::malformed_declaration(
                dir,
                "Schema directory does not exist",
            ));
        }

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::malformed_declaration(
                dir.as_str(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_declaration(
                    dir.as_str(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;

            let path = entry.path();

            // Skip non-JSON files
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            paths.push(path);
        }

        // read_dir order is platform dependent
        paths.sort();

        for path in &paths {
            self.read_file(path)?;
        }

        Ok(())
    }

    /// Read a single declaration file.
    pub fn read_file(&mut self, path: &Path) -> SchemaResult<()> {
        let source = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed_declaration(source.as_str(), format!("Failed to read file: {}", e))
        })?;

        let file: DeclarationFile = serde_json::from_str(&content).map_err(|e| {
            SchemaError::malformed_declaration(source.as_str(), format!("Invalid JSON: {}", e))
        })?;

        for manifest in file.into_declarations() {
            self.add_from(manifest, &source)?;
        }

        Ok(())
    }

    /// Add a declaration directly (for testing or programmatic creation).
    pub fn add(&mut self, manifest: DeclarationManifest) -> SchemaResult<()> {
        self.add_from(manifest, "<in-memory>")
    }

    fn add_from(&mut self, manifest: DeclarationManifest, source: &str) -> SchemaResult<()> {
        if manifest.name.is_empty() {
            return Err(SchemaError::malformed_declaration(source, "Type name must not be empty"));
        }

        if let Some(previous) = self.sources.get(&manifest.name) {
            return Err(SchemaError::declaration_failed(format!(
                "Type '{}' declared in both '{}' and '{}'",
                manifest.name, previous, source
            ))
            .with_type_name(manifest.name.as_str()));
        }

        self.sources.insert(manifest.name.clone(), source.to_string());
        self.manifests.insert(manifest.name.clone(), manifest);
        Ok(())
    }

    /// Declare every read manifest into `registry` in dependency order.
    ///
    /// References may also point at types the registry already holds. The
    /// load is all-or-nothing: on error `registry` is left unchanged.
    pub fn declare_into(&self, registry: &mut TypeRegistry) -> SchemaResult<Vec<Arc<TypeRecord>>> {
        let order = self.resolution_order(registry)?;

        let mut staged = registry.clone();
        let mut records = Vec::with_capacity(order.len());
        for name in order {
            let manifest = &self.manifests[name];
            let declaration = Self::to_declaration(manifest, &staged)?;
            records.push(staged.declare(declaration)?);
        }

        *registry = staged;
        Ok(records)
    }

    /// Depth-first topological order over bases and nested references.
    fn resolution_order<'a>(&'a self, registry: &TypeRegistry) -> SchemaResult<Vec<&'a str>> {
        let mut marks: BTreeMap<&'a str, Mark> = BTreeMap::new();
        let mut order = Vec::with_capacity(self.manifests.len());
        let mut path = Vec::new();

        for name in self.manifests.keys() {
            self.visit(name, registry, &mut marks, &mut order, &mut path)?;
        }

        Ok(order)
    }

    fn visit<'a>(
        &'a self,
        name: &'a str,
        registry: &TypeRegistry,
        marks: &mut BTreeMap<&'a str, Mark>,
        order: &mut Vec<&'a str>,
        path: &mut Vec<&'a str>,
    ) -> SchemaResult<()> {
        match marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let start = path.iter().position(|n| *n == name).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(name);
                return Err(SchemaError::declaration_failed(format!(
                    "cyclic reference: {}",
                    cycle.join(" -> ")
                ))
                .with_type_name(name));
            }
            None => {}
        }

        let manifest = &self.manifests[name];
        marks.insert(name, Mark::Visiting);
        path.push(name);

        for dep in manifest.references() {
            if self.manifests.contains_key(dep) {
                self.visit(dep, registry, marks, order, path)?;
            } else if !registry.contains(dep) {
                return Err(SchemaError::declaration_failed(format!(
                    "Type '{}' references unknown type '{}'",
                    name, dep
                ))
                .with_type_name(name));
            }
        }

        path.pop();
        marks.insert(name, Mark::Done);
        order.push(name);
        Ok(())
    }

    fn to_declaration(
        manifest: &DeclarationManifest,
        registry: &TypeRegistry,
    ) -> SchemaResult<TypeDeclaration> {
        let mut declaration = TypeDeclaration::new(manifest.name.as_str());

        for base in &manifest.bases {
            declaration = declaration.extends(Self::lookup(registry, &manifest.name, base)?);
        }

        for (name, field) in &manifest.fields {
            let descriptor = Self::to_descriptor(field, &manifest.name, registry)?;
            declaration = declaration.field(name.as_str(), descriptor);
        }

        for field in &manifest.remove {
            declaration = declaration.remove(field.as_str());
        }

        Ok(declaration)
    }

    fn to_descriptor(
        field: &FieldManifest,
        owner: &str,
        registry: &TypeRegistry,
    ) -> SchemaResult<FieldDescriptor> {
        let unknown = field.unknown_keys();
        if !unknown.is_empty() {
            return Err(SchemaError::declaration_failed(format!(
                "Type '{}' has a field with unknown key(s): {}",
                owner,
                unknown.join(", ")
            ))
            .with_type_name(owner));
        }

        let mut descriptor = match &field.kind {
            FieldKindManifest::String => FieldDescriptor::string(),
            FieldKindManifest::Int => FieldDescriptor::int(),
            FieldKindManifest::Float => FieldDescriptor::float(),
            FieldKindManifest::Bool => FieldDescriptor::boolean(),
            FieldKindManifest::Email => FieldDescriptor::email(),
            FieldKindManifest::Raw => FieldDescriptor::raw(),
            FieldKindManifest::List { element } => {
                FieldDescriptor::list(Self::to_descriptor(element, owner, registry)?)
            }
            FieldKindManifest::Nested { schema } => {
                FieldDescriptor::nested(Self::lookup(registry, owner, schema)?)
            }
        };

        if field.required {
            descriptor = descriptor.required();
        }
        if field.allow_null {
            descriptor = descriptor.nullable();
        }

        Ok(descriptor)
    }

    fn lookup<'r>(
        registry: &'r TypeRegistry,
        owner: &str,
        name: &str,
    ) -> SchemaResult<&'r Arc<TypeRecord>> {
        registry.get(name).ok_or_else(|| {
            SchemaError::declaration_failed(format!(
                "Type '{}' references unknown type '{}'",
                owner, name
            ))
            .with_type_name(owner)
        })
    }
}
