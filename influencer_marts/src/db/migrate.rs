//! Embedded schema migrations for the raw tables.

use anyhow::anyhow;
use diesel::{Connection, SqliteConnection, connection::SimpleConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use super::connection::sqlite_path;

/// Raw-table migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Switch the file to WAL and create or upgrade `raw_influencers`,
/// `raw_posts` and `raw_tracking_data`.
pub fn run_sqlite(url: &str) -> anyhow::Result<()> {
    let mut conn = SqliteConnection::establish(sqlite_path(url))?;
    conn.batch_execute("PRAGMA journal_mode=WAL;")?;
    let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| anyhow!(e))?;
    tracing::info!(applied = applied.len(), "migrations applied");

    Ok(())
}

/// Migrate the store named by `database_url`.
///
/// Bare paths and `sqlite:` URLs are accepted; PostgreSQL URLs are rejected.
pub fn run_all(database_url: &str) -> anyhow::Result<()> {
    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        anyhow::bail!("Unsupported DATABASE_URL (PostgreSQL is not supported): {database_url}");
    }
    run_sqlite(database_url)
}
