//! PostgreSQL persistence for Darkroom.
//!
//! Media records live in `media_records`; size variants live in
//! `size_variants` with primary key `(record_id, kind)`, which is what makes
//! concurrent creation of the same variant safe across workers.
//!
//! # Example
//!
//! ```rust,ignore
//! use darkroom_database::{PostgresMediaRepository, establish_pool, run_migrations};
//!
//! # fn example() -> darkroom_error::DarkroomResult<()> {
//! let pool = establish_pool("postgres://localhost/darkroom", 10)?;
//! run_migrations(&mut pool.get().expect("connection"))?;
//! let repository = PostgresMediaRepository::new(pool);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod models;
mod repository;

/// Diesel table definitions.
#[allow(missing_docs)]
pub mod schema;

pub use connection::{DbPool, database_url, establish_connection, establish_pool, run_migrations};
pub use models::{MediaRecordRow, SizeVariantRow};
pub use repository::PostgresMediaRepository;
