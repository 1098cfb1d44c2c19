//! On-disk declaration format
//!
//! ```json
//! {
//!   "name": "Album",
//!   "bases": [],
//!   "fields": {
//!     "name": {"type": "string", "required": true},
//!     "songs": {"type": "list", "element": {"type": "string"}},
//!     "singer": {"type": "nested", "schema": "Person"}
//!   },
//!   "remove": []
//! }
//! ```
//!
//! A file holds one declaration or an array of them.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Field kinds as written in declaration files
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKindManifest {
    String,
    Int,
    Float,
    Bool,
    Email,
    Raw,
    List {
        element: Box<FieldManifest>,
    },
    /// Reference to another declared type, by name
    Nested {
        schema: String,
    },
}

/// One field as written in a declaration file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldManifest {
    #[serde(flatten)]
    pub kind: FieldKindManifest,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub allow_null: bool,
    /// Keys left over after the kind and flags are read
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl FieldManifest {
    /// Keys that belong to no part of the field format, sorted
    pub fn unknown_keys(&self) -> Vec<&str> {
        let owned: &[&str] = match &self.kind {
            FieldKindManifest::List { .. } => &["type", "element"],
            FieldKindManifest::Nested { .. } => &["type", "schema"],
            _ => &["type"],
        };
        self.extra
            .keys()
            .map(String::as_str)
            .filter(|key| !owned.contains(key))
            .collect()
    }

    /// Collect every type name this field refers to
    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match &self.kind {
            FieldKindManifest::Nested { schema } => out.push(schema),
            FieldKindManifest::List { element } => element.collect_references(out),
            _ => {}
        }
    }
}

/// One type declaration as written in a declaration file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclarationManifest {
    pub name: String,
    #[serde(default)]
    pub bases: Vec<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldManifest>,
    #[serde(default)]
    pub remove: Vec<String>,
}

impl DeclarationManifest {
    /// Type names that must be declared before this one: bases first, then
    /// nested references
    pub fn references(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.bases.iter().map(String::as_str).collect();
        for field in self.fields.values() {
            field.collect_references(&mut out);
        }
        out
    }
}

/// Contents of one declaration file
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DeclarationFile {
    One(DeclarationManifest),
    Many(Vec<DeclarationManifest>),
}

impl DeclarationFile {
    pub fn into_declarations(self) -> Vec<DeclarationManifest> {
        match self {
            DeclarationFile::One(decl) => vec![decl],
            DeclarationFile::Many(decls) => decls,
        }
    }
}
