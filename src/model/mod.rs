//! Declarative object model
//!
//! Declaration time: a [`TypeDeclaration`] goes through the registrar once,
//! which aggregates fields across the ancestry, compiles a schema, and yields
//! an immutable [`TypeRecord`].
//!
//! Construction time: keyword input passes through the record's schema and
//! becomes an [`Instance`] with one slot per declared field.
//!
//! Read time: [`Instance::asdict`] rebuilds a complete dictionary, flattening
//! nested instances recursively.
//!
//! Declarations can also come from JSON files through [`DeclarationLoader`].

mod aggregator;
mod declaration;
mod instance;
mod loader;
mod manifest;
mod record;
mod registry;

pub use aggregator::{aggregate, linearize};
pub use declaration::{FieldDirective, LocalFields, TypeDeclaration};
pub use instance::{Instance, Slot};
pub use loader::DeclarationLoader;
pub use manifest::{DeclarationFile, DeclarationManifest, FieldKindManifest, FieldManifest};
pub use record::TypeRecord;
pub use registry::TypeRegistry;
