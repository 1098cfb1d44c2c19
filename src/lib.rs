//! mallows - declarative, inheritance-aware schema objects
//!
//! Types declare fields; fields accumulate down the inheritance chain, may
//! be overridden or removed, and compile into a schema that validates keyword
//! input, builds instances, and serializes them back to complete dictionaries.
//!
//! ```ignore
//! let person = registry.declare(
//!     TypeDeclaration::new("Person").field("name", FieldDescriptor::string().required()),
//! )?;
//! let album = registry.declare(
//!     TypeDeclaration::new("Album")
//!         .field("songs", FieldDescriptor::list(FieldDescriptor::string()))
//!         .field("singer", FieldDescriptor::nested(&person)),
//! )?;
//! let instance = album.construct_value(&json!({"singer": {"name": "Nicki Minaj"}}))?;
//! assert_eq!(instance.asdict()["songs"], Value::Null);
//! ```

pub mod cli;
pub mod config;
pub mod model;
pub mod observability;
pub mod schema;

pub use config::{Config, ConfigError};
pub use model::{DeclarationLoader, Instance, Slot, TypeDeclaration, TypeRecord, TypeRegistry};
pub use schema::{FieldDescriptor, FieldKind, FieldValue, SchemaError, SchemaErrorCode, SchemaResult};
