//! Database schema migrations for taskboard.
//!
//! Migrations are versioned and applied automatically when opening the
//! database. The `schema_version` table tracks the current migration
//! version. v1 databases predate soft archival and derived group status;
//! v2 upgrades them the same way the backup importer upgrades v1 snapshots.

use rusqlite::{Connection, Result as SqliteResult};

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

/// Create the schema_version table if it doesn't exist.
fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or(0)
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration v1: Initial schema (baseline).
///
/// A no-op since the base tables are created by BoardDb::migrate() directly.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    set_schema_version(conn, 1)?;
    Ok(())
}

/// Migration v2: Add archival and derived-status columns.
///
/// Adds to projects, categories, sub_categories, and tasks:
/// - archived_at: archival timestamp (NULL = active)
/// - archive_batch: token shared by rows archived in one cascade
///
/// Adds to categories and sub_categories:
/// - status: derived group status (ACTIVE / COMPLETED)
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "ALTER TABLE projects ADD COLUMN archived_at TEXT;
         ALTER TABLE projects ADD COLUMN archive_batch TEXT;
         ALTER TABLE categories ADD COLUMN archived_at TEXT;
         ALTER TABLE categories ADD COLUMN archive_batch TEXT;
         ALTER TABLE categories ADD COLUMN status TEXT NOT NULL DEFAULT 'ACTIVE';
         ALTER TABLE sub_categories ADD COLUMN archived_at TEXT;
         ALTER TABLE sub_categories ADD COLUMN archive_batch TEXT;
         ALTER TABLE sub_categories ADD COLUMN status TEXT NOT NULL DEFAULT 'ACTIVE';
         ALTER TABLE tasks ADD COLUMN archived_at TEXT;
         ALTER TABLE tasks ADD COLUMN archive_batch TEXT;",
    )?;

    tx.execute("DELETE FROM schema_version", [])?;
    tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [2])?;

    tx.commit()?;
    Ok(())
}
