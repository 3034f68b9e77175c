//! Darkroom CLI binary.
//!
//! This binary provides command-line access to Darkroom's pipeline:
//! - Ingest photos and videos, pairing live photos
//! - Backfill a missing size variant over stored photos

use clap::Parser;
use darkroom::{DarkroomConfig, DarkroomResult, DiagnosticLog, MediaRepository, pipeline_context};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, generate_thumbs, ingest_files};

    // Parse command-line arguments
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    // Initialize tracing; RUST_LOG overrides the default level
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }

    let config = match &cli.config {
        Some(path) => DarkroomConfig::from_file(path)?,
        None => DarkroomConfig::load()?,
    };
    let repository = open_repository(&config)?;
    let context = pipeline_context(&config, repository, DiagnosticLog::new())?;

    // Execute the requested command
    match cli.command {
        Commands::Ingest { files, mime } => {
            ingest_files(context, &files, mime.as_deref()).await?;
        }

        Commands::GenerateThumbs {
            size_variant,
            amount,
            timeout,
        } => {
            generate_thumbs(context, &config.backfill, &size_variant, amount, timeout).await?;
        }
    }

    Ok(())
}

/// PostgreSQL repository named by `[database]` or `DATABASE_URL`.
#[cfg(feature = "database")]
fn open_repository(config: &DarkroomConfig) -> DarkroomResult<Arc<dyn MediaRepository>> {
    use darkroom::{PostgresMediaRepository, database_url, establish_connection, establish_pool, run_migrations};

    let url = database_url(&config.database)?;
    let mut conn = establish_connection(&url)?;
    run_migrations(&mut conn)?;
    Ok(Arc::new(PostgresMediaRepository::new(establish_pool(&url, 4)?)))
}

#[cfg(not(feature = "database"))]
fn open_repository(_config: &DarkroomConfig) -> DarkroomResult<Arc<dyn MediaRepository>> {
    tracing::warn!("Built without the database feature; records are kept for this run only");
    Ok(Arc::new(darkroom::InMemoryMediaRepository::new()))
}
