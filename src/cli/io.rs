//! JSON I/O handling for CLI
//!
//! - Input: single JSON value via stdin
//! - Output: single JSON object via stdout
//! - UTF-8 only

use std::io::{self, Read, Write};

use serde_json::{json, Value};

use crate::schema::SchemaError;

use super::errors::{CliError, CliResult};

/// Read a JSON request from stdin
pub fn read_request() -> CliResult<Value> {
    read_request_from(io::stdin().lock())
}

/// Read a JSON request from any reader; the document may span lines
pub fn read_request_from<R: Read>(mut reader: R) -> CliResult<Value> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    if content.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    let value: Value = serde_json::from_str(&content)?;
    Ok(value)
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_to(&mut io::stdout(), &success_body(data))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_error_to(&mut io::stdout(), code, message)
}

pub(super) fn write_error_to<W: Write>(out: &mut W, code: &str, message: &str) -> CliResult<()> {
    write_to(
        out,
        &json!({
            "status": "error",
            "code": code,
            "message": message
        }),
    )
}

/// Write a construction failure, including its field error tree, to stdout
pub fn write_schema_error(error: &SchemaError) -> CliResult<()> {
    write_to(&mut io::stdout(), &schema_error_body(error))
}

fn success_body(data: Value) -> Value {
    json!({
        "status": "ok",
        "data": data
    })
}

fn schema_error_body(error: &SchemaError) -> Value {
    let errors = match error.field_errors() {
        Some(tree) => serde_json::to_value(tree).unwrap_or(Value::Null),
        None => Value::Null,
    };

    json!({
        "status": "error",
        "code": error.code().code(),
        "message": error.message(),
        "errors": errors
    })
}

fn write_to<W: Write>(out: &mut W, response: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, response)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
