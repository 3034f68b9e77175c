//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the darkroom binary.

mod commands;
mod generate;
mod ingest;

pub use commands::{Cli, Commands};
pub use generate::generate_thumbs;
pub use ingest::ingest_files;
