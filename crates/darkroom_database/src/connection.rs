//! Database connection utilities.

use darkroom_core::DatabaseSettings;
use darkroom_error::{DarkroomResult, DatabaseError, DatabaseErrorKind};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

/// Pooled PostgreSQL connections.
pub type DbPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Connection URL from settings, falling back to `DATABASE_URL`.
///
/// # Errors
///
/// Returns an error if neither is set.
pub fn database_url(settings: &DatabaseSettings) -> DarkroomResult<String> {
    if let Some(url) = &settings.url {
        return Ok(url.clone());
    }
    std::env::var("DATABASE_URL").map_err(|_| {
        DatabaseError::new(DatabaseErrorKind::Connection(
            "DATABASE_URL environment variable not set".to_string(),
        ))
        .into()
    })
}

/// Establish a single connection.
pub fn establish_connection(database_url: &str) -> DarkroomResult<PgConnection> {
    Ok(PgConnection::establish(database_url).map_err(DatabaseError::from)?)
}

/// Build a connection pool and check that a connection can be obtained.
#[tracing::instrument(skip(database_url))]
pub fn establish_pool(database_url: &str, pool_size: u32) -> DarkroomResult<DbPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(pool_size)
        .build(manager)
        .map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Connection(format!(
                "Failed to create connection pool: {}",
                e
            )))
        })?;
    tracing::debug!(pool_size, "Created connection pool");
    Ok(pool)
}

/// Run pending migrations.
#[tracing::instrument(skip(conn))]
pub fn run_migrations(conn: &mut PgConnection) -> DarkroomResult<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Migration(e.to_string())))?;
    tracing::info!(count = applied.len(), "Applied migrations");
    Ok(())
}
