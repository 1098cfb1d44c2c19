//! CLI argument definitions using clap
//!
//! Commands:
//! - mallows check --config <path>
//! - mallows load --config <path> --type <Name>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// mallows - declarative, inheritance-aware schema objects
#[derive(Parser, Debug)]
#[command(name = "mallows")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load all declarations and print each type's fields
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./mallows.json")]
        config: PathBuf,
    },

    /// Read one JSON object from stdin and print the constructed instance
    Load {
        /// Path to configuration file
        #[arg(long, default_value = "./mallows.json")]
        config: PathBuf,

        /// Declared type to construct
        #[arg(long = "type")]
        type_name: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
