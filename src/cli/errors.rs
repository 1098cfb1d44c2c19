//! CLI-specific error types
//!
//! All CLI errors end the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::schema::SchemaError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Declarations could not be loaded
    DeclarationError,
    /// `--type` names no declared type
    UnknownType,
    /// Input did not construct an instance
    InputRejected,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "MALLOWS_CLI_CONFIG_ERROR",
            Self::IoError => "MALLOWS_CLI_IO_ERROR",
            Self::DeclarationError => "MALLOWS_CLI_DECLARATION_ERROR",
            Self::UnknownType => "MALLOWS_CLI_UNKNOWN_TYPE",
            Self::InputRejected => "MALLOWS_CLI_INPUT_REJECTED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn declaration_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::DeclarationError, msg)
    }

    pub fn unknown_type(name: &str) -> Self {
        Self::new(
            CliErrorCode::UnknownType,
            format!("Type '{}' is not declared", name),
        )
    }

    pub fn input_rejected(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InputRejected, msg)
    }

    /// Get the error code
    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the error body was already written to stdout
    pub fn is_reported(&self) -> bool {
        self.code == CliErrorCode::InputRejected
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::declaration_error(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
