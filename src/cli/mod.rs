//! CLI module for mallows
//!
//! Provides command-line interface for:
//! - check: Load every declaration and list each type's fields
//! - load: Construct one instance from stdin and print its dictionary form

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{boot, check, load, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response, write_schema_error};
