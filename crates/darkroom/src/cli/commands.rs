//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Darkroom - derive size variants and pair live photos
#[derive(Parser, Debug)]
#[command(name = "darkroom")]
#[command(about = "Derive size variants and pair live photos", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file to use instead of the usual search path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store files, pair live photos and create their size variants
    Ingest {
        /// Files to ingest
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// MIME type to declare instead of guessing from the extension
        #[arg(long)]
        mime: Option<String>,
    },

    /// Create a missing size variant for stored photos
    GenerateThumbs {
        /// Size variant to create (thumb, thumb2x, small, small2x, medium, medium2x)
        #[arg(value_name = "TYPE")]
        size_variant: String,

        /// Maximum number of photos to process
        amount: Option<usize>,

        /// Time budget in seconds
        timeout: Option<u64>,
    },
}
