//! Error types for the Darkroom library.
//!
//! This crate provides the foundation error types used throughout the Darkroom workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Render, probe and metadata failures are expected during ingestion and are
//! usually turned into diagnostics by the pipeline instead of being returned.
//!
//! # Examples
//!
//! ```
//! use darkroom_error::{DarkroomResult, StorageError, StorageErrorKind};
//!
//! fn read_original() -> DarkroomResult<Vec<u8>> {
//!     Err(StorageError::new(StorageErrorKind::Missing("original/ab/cd/ef.jpg".to_string())))?
//! }
//!
//! match read_original() {
//!     Ok(bytes) => println!("Got {} bytes", bytes.len()),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
#[cfg(feature = "database")]
mod database;
mod error;
mod pipeline;
mod render;
mod repository;
mod storage;
mod video;

pub use config::{ConfigError, ConfigErrorKind};
#[cfg(feature = "database")]
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{DarkroomError, DarkroomErrorKind, DarkroomResult};
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use render::{RenderError, RenderErrorKind};
pub use repository::{RepositoryError, RepositoryErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use video::{VideoToolError, VideoToolErrorKind};
