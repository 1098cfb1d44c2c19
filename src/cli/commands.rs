//! CLI command implementations
//!
//! Both commands share one boot sequence:
//! 1. Configuration load
//! 2. Log level applied
//! 3. Declarations loaded from the schema directory

use std::io::{self, Write};
use std::path::Path;

use serde_json::{Map, Value};

use crate::config::Config;
use crate::model::{DeclarationLoader, TypeRegistry};
use crate::observability::{log_event_with_fields, Event, Logger};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error_to, write_response, write_schema_error};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    report(&mut io::stdout(), run_command(cli.command))
}

/// Write the JSON error body for a failed command, unless the command
/// already wrote one
fn report<W: Write>(out: &mut W, result: CliResult<()>) -> CliResult<()> {
    if let Err(e) = &result {
        if !e.is_reported() {
            write_error_to(out, e.code_str(), e.message())?;
        }
    }
    result
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Check { config } => check(&config),
        Command::Load { config, type_name } => load(&config, &type_name),
    }
}

/// Load configuration and every declaration it points at
pub fn boot(config_path: &Path) -> CliResult<TypeRegistry> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);

    let schema_dir = config.schema_dir.display().to_string();
    let strict = config.strict_removals.to_string();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("schema_dir", schema_dir.as_str()),
            ("strict_removals", strict.as_str()),
        ],
    );

    let mut registry = TypeRegistry::from_config(&config);
    DeclarationLoader::new(&config.schema_dir).load_all(&mut registry)?;

    Ok(registry)
}

/// Print every declared type with its aggregated field names
pub fn check(config_path: &Path) -> CliResult<()> {
    let registry = boot(config_path)?;
    write_response(Value::Object(field_listing(&registry)))
}

/// Construct one instance of `type_name` from stdin and print its
/// dictionary form
///
/// A rejected input is reported on stdout with its field error tree and
/// still ends the process with a failure.
pub fn load(config_path: &Path, type_name: &str) -> CliResult<()> {
    let registry = boot(config_path)?;

    let record = registry
        .get(type_name)
        .ok_or_else(|| CliError::unknown_type(type_name))?;

    let request = read_request()?;

    match record.construct_value(&request) {
        Ok(instance) => write_response(Value::Object(instance.asdict())),
        Err(e) => {
            write_schema_error(&e)?;
            Err(CliError::input_rejected(e.message()))
        }
    }
}

fn field_listing(registry: &TypeRegistry) -> Map<String, Value> {
    registry
        .records()
        .map(|record| {
            let fields = record
                .field_names()
                .map(|name| Value::String(name.to_string()))
                .collect();
            (record.name().to_string(), Value::Array(fields))
        })
        .collect()
}
