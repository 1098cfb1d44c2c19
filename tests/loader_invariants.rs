//! Declaration Loader Invariant Tests
//!
//! Tests for loading type declarations from a schema directory:
//! - Declaration order follows references, not file names
//! - Loaded types behave exactly like builder-declared ones
//! - Cycles and unknown references are declaration errors
//! - Malformed files fail the whole load

use std::fs;
use std::path::Path;

use mallows::config::Config;
use mallows::model::{DeclarationLoader, TypeDeclaration, TypeRegistry};
use mallows::schema::{FieldDescriptor, SchemaErrorCode, INVALID_EMAIL};
use serde_json::{json, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn write(dir: &Path, file: &str, content: &str) {
    fs::write(dir.join(file), content).unwrap();
}

fn load_dir(dir: &Path) -> Result<TypeRegistry, mallows::schema::SchemaError> {
    let mut registry = TypeRegistry::new();
    DeclarationLoader::new(dir).load_all(&mut registry)?;
    Ok(registry)
}

fn write_music(dir: &Path) {
    write(
        dir,
        "album.json",
        r#"{
            "name": "Album",
            "fields": {
                "name": {"type": "string"},
                "songs": {"type": "list", "element": {"type": "string"}},
                "singer": {"type": "nested", "schema": "Person"}
            }
        }"#,
    );
    write(
        dir,
        "person.json",
        r#"{
            "name": "Person",
            "fields": {
                "name": {"type": "string"},
                "email": {"type": "email"}
            }
        }"#,
    );
}

// =============================================================================
// Loading Tests
// =============================================================================

/// Album sorts before Person but depends on it.
#[test]
fn test_references_declared_first() {
    let tmp = TempDir::new().unwrap();
    write_music(tmp.path());

    let registry = load_dir(tmp.path()).unwrap();
    assert_eq!(registry.type_names().collect::<Vec<_>>(), vec!["Album", "Person"]);

    let album = registry.get("Album").unwrap();
    assert_eq!(album.field_names().collect::<Vec<_>>(), vec!["name", "singer", "songs"]);
}

/// Loaded types round-trip nested dictionaries.
#[test]
fn test_loaded_types_round_trip() {
    let tmp = TempDir::new().unwrap();
    write_music(tmp.path());
    let registry = load_dir(tmp.path()).unwrap();

    let person = registry.get("Person").unwrap();
    let album = registry.get("Album").unwrap();

    let nicki = person.construct_value(&json!({"name": "Nicki Minaj"})).unwrap();
    let record = album
        .construct_value(&json!({"singer": Value::Object(nicki.asdict()), "songs": []}))
        .unwrap();

    assert_eq!(
        Value::Object(record.asdict()),
        json!({
            "name": null,
            "singer": {"email": null, "name": "Nicki Minaj"},
            "songs": []
        })
    );

    let err = person.construct_value(&json!({"email": "nope"})).unwrap_err();
    assert!(err.field_errors().unwrap().get("email").unwrap().contains_message(INVALID_EMAIL));
}

/// File-declared and builder-declared types have the same field mapping.
#[test]
fn test_file_matches_builder() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "beings.json",
        r#"[
            {"name": "KardeshevBeing", "fields": {"level": {"type": "int"}}},
            {"name": "Alien", "bases": ["KardeshevBeing"], "fields": {"planet": {"type": "string"}}},
            {"name": "Human", "bases": ["Alien"], "fields": {"name": {"type": "string", "required": true}}},
            {"name": "Android", "bases": ["Human"], "remove": ["planet"]}
        ]"#,
    );
    let loaded = load_dir(tmp.path()).unwrap();

    let mut built = TypeRegistry::new();
    let being = built
        .declare(TypeDeclaration::new("KardeshevBeing").field("level", FieldDescriptor::int()))
        .unwrap();
    let alien = built
        .declare(
            TypeDeclaration::new("Alien")
                .extends(&being)
                .field("planet", FieldDescriptor::string()),
        )
        .unwrap();
    let human = built
        .declare(
            TypeDeclaration::new("Human")
                .extends(&alien)
                .field("name", FieldDescriptor::string().required()),
        )
        .unwrap();
    let android = built
        .declare(TypeDeclaration::new("Android").extends(&human).remove("planet"))
        .unwrap();

    let from_file = loaded.get("Android").unwrap();
    assert_eq!(
        from_file.field_names().collect::<Vec<_>>(),
        android.field_names().collect::<Vec<_>>()
    );
    assert_eq!(from_file.ancestry_names(), android.ancestry_names());

    for input in [json!({"name": "R2"}), json!({}), json!({"planet": "Tatooine", "name": "C3"})] {
        let a = from_file.construct_value(&input).map(|i| i.asdict());
        let b = android.construct_value(&input).map(|i| i.asdict());
        assert_eq!(a.is_ok(), b.is_ok());
        if let (Ok(a), Ok(b)) = (a, b) {
            assert_eq!(a, b);
        }
    }
}

/// Non-JSON files are ignored; an empty directory loads nothing.
#[test]
fn test_non_json_files_ignored() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "README.md", "# declarations");

    let registry = load_dir(tmp.path()).unwrap();
    assert!(registry.is_empty());
}

// =============================================================================
// Declaration Error Tests
// =============================================================================

/// Mutually nested types cannot be declared.
#[test]
fn test_nested_cycle_rejected() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "cycle.json",
        r#"[
            {"name": "Chicken", "fields": {"from": {"type": "nested", "schema": "Egg"}}},
            {"name": "Egg", "fields": {"from": {"type": "nested", "schema": "Chicken"}}}
        ]"#,
    );

    let err = load_dir(tmp.path()).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::DeclarationFailed);
    assert!(err.is_fatal());
    assert!(err.message().contains("cyclic reference: Chicken -> Egg -> Chicken"));
}

/// A type cannot inherit from itself.
#[test]
fn test_inheritance_cycle_rejected() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "ouroboros.json", r#"{"name": "Ouroboros", "bases": ["Ouroboros"]}"#);

    let err = load_dir(tmp.path()).unwrap_err();
    assert!(err.message().contains("cyclic reference"));
}

/// References must resolve to a declared type.
#[test]
fn test_unknown_reference_rejected() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "album.json",
        r#"{"name": "Album", "fields": {"singer": {"type": "nested", "schema": "Person"}}}"#,
    );

    let err = load_dir(tmp.path()).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::DeclarationFailed);
    assert!(err.message().contains("unknown type 'Person'"));
}

/// A malformed file fails the load.
#[test]
fn test_malformed_file_rejected() {
    let tmp = TempDir::new().unwrap();
    write_music(tmp.path());
    write(tmp.path(), "broken.json", r#"{"name": "Broken", "fields": {"x": {"type": "date"}}}"#);

    let err = load_dir(tmp.path()).unwrap_err();
    assert!(err.message().contains("broken.json"));
}

/// Strict removal applies to loaded declarations too, unless configured off.
#[test]
fn test_removal_strictness_from_config() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "loose.json", r#"{"name": "Loose", "remove": ["ghost"]}"#);

    let err = load_dir(tmp.path()).unwrap_err();
    assert!(err.message().contains("ghost"));

    let config = Config::from_json(r#"{"schema_dir": "unused", "strict_removals": false}"#).unwrap();
    let mut registry = TypeRegistry::from_config(&config);
    DeclarationLoader::new(tmp.path()).load_all(&mut registry).unwrap();
    assert!(registry.get("Loose").unwrap().fields().is_empty());
}

/// Misspelled keys fail the load instead of changing the schema.
#[test]
fn test_misspelled_keys_rejected() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "being.json",
        r#"{"name": "Being", "fields": {"level": {"type": "int"}, "name": {"type": "string"}}}"#,
    );
    write(tmp.path(), "alien.json", r#"{"name": "Alien", "bases": ["Being"], "remvoe": ["name"]}"#);

    let err = load_dir(tmp.path()).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::DeclarationFailed);
    assert!(err.message().contains("alien.json"));

    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "person.json",
        r#"{"name": "Person", "fields": {"name": {"type": "string", "requierd": true}}}"#,
    );

    let err = load_dir(tmp.path()).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::DeclarationFailed);
    assert!(err.message().contains("requierd"));
}

/// A load that fails partway declares nothing.
#[test]
fn test_failed_load_is_all_or_nothing() {
    let tmp = TempDir::new().unwrap();
    write_music(tmp.path());
    write(tmp.path(), "reserved.json", r#"{"name": "Reserved", "fields": {"_schema": {"type": "raw"}}}"#);

    let mut registry = TypeRegistry::new();
    registry.declare(TypeDeclaration::new("Existing")).unwrap();

    let err = DeclarationLoader::new(tmp.path()).load_all(&mut registry).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::DeclarationFailed);
    assert_eq!(registry.type_names().collect::<Vec<_>>(), vec!["Existing"]);
}
