//! Database schema migrations.
//!
//! The current schema version is held in the `schema_version` table. Each migration brings the
//! database from version `N-1` to version `N` and is safe to run against a database that already
//! has its effect applied, which lets us adopt databases that were created before versioning
//! existed. Migrations only ever add; nothing is dropped.
//!
//! SQL migrations are stored in this directory as `migration_NN_up.sql`.

use anyhow::{bail, Context};
use sqlx::{Executor, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::Result;

/// The version the schema is at once every migration has run.
pub(crate) const CURRENT_VERSION: i32 = 3;

/// What a migration does.
enum Step {
    /// Executes SQL that is idempotent by itself, e.g. `CREATE TABLE IF NOT EXISTS`.
    Sql(&'static str),
    /// Adds a column unless `PRAGMA table_info` shows it is already there.
    AddColumn {
        table: &'static str,
        column: &'static str,
        definition: &'static str,
    },
}

/// A database migration.
struct Migration {
    /// The version this migration brings the database to.
    version: i32,
    /// Shown in logs.
    description: &'static str,
    step: Step,
}

/// All available migrations in order.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create the transactions table",
        step: Step::Sql(include_str!("migration_01_up.sql")),
    },
    Migration {
        version: 2,
        description: "add the deleted flag",
        step: Step::AddColumn {
            table: "transactions",
            column: "deleted",
            definition: "INTEGER NOT NULL DEFAULT 0",
        },
    },
    Migration {
        version: 3,
        description: "index active listings",
        step: Step::Sql(include_str!("migration_03_up.sql")),
    },
];

/// Creates the `schema_version` table if it does not exist and returns the recorded version. A
/// database without the table is treated as version 0.
pub(crate) async fn bootstrap(pool: &SqlitePool) -> Result<i32> {
    sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
        .execute(pool)
        .await
        .context("Failed to create schema_version table")?;

    let row: (Option<i32>,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Failed to query schema version")?;

    match row.0 {
        Some(version) => Ok(version),
        None => {
            sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
                .execute(pool)
                .await
                .context("Failed to insert initial schema version")?;
            Ok(0)
        }
    }
}

/// Runs migrations to bring the database from `current_ver` up to `target_ver`.
///
/// Each migration is executed within a transaction that includes the schema_version update.
/// Downgrading is not supported: a database newer than this program is an error.
pub(crate) async fn run(pool: &SqlitePool, current_ver: i32, target_ver: i32) -> Result<()> {
    if current_ver == target_ver {
        debug!("Database already at target version {target_ver}, no migrations needed");
        return Ok(());
    }
    if current_ver > target_ver {
        bail!(
            "The database schema is at version {current_ver} but this program only understands \
            up to version {target_ver}"
        );
    }

    validate_migrations(current_ver, target_ver)?;

    for version in (current_ver + 1)..=target_ver {
        let migration = MIGRATIONS
            .iter()
            .find(|m| m.version == version)
            .with_context(|| format!("Migration {version} not found"))?;

        debug!("Running migration {version:02}: {}", migration.description);
        run_single_migration(pool, migration).await?;
    }

    debug!("Migration complete, schema now at version {target_ver}");
    Ok(())
}

/// Applies a single migration and updates schema_version, all within a transaction.
async fn run_single_migration(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin migration transaction")?;

    match &migration.step {
        Step::Sql(sql) => {
            (&mut *tx)
                .execute(*sql)
                .await
                .context("Failed to execute migration SQL")?;
        }
        Step::AddColumn {
            table,
            column,
            definition,
        } => {
            if column_exists(&mut tx, table, column).await? {
                debug!("Column {table}.{column} already exists, nothing to add");
            } else {
                let sql = format!("ALTER TABLE {table} ADD COLUMN {column} {definition}");
                (&mut *tx)
                    .execute(sql.as_str())
                    .await
                    .with_context(|| format!("Failed to add column {table}.{column}"))?;
            }
        }
    }

    sqlx::query("DELETE FROM schema_version")
        .execute(&mut *tx)
        .await
        .context("Failed to clear schema_version")?;

    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(migration.version)
        .execute(&mut *tx)
        .await
        .context("Failed to update schema_version")?;

    tx.commit()
        .await
        .context("Failed to commit migration transaction")?;

    Ok(())
}

async fn column_exists(conn: &mut SqliteConnection, table: &str, column: &str) -> Result<bool> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pragma_table_info(?) WHERE name = ?")
        .bind(table)
        .bind(column)
        .fetch_one(conn)
        .await
        .with_context(|| format!("Failed to inspect the columns of {table}"))?;
    Ok(row.0 > 0)
}

/// Validates that migrations are available for all versions needed to go from
/// `current_version` to `target_version`.
fn validate_migrations(current_version: i32, target_version: i32) -> Result<()> {
    for version in (current_version + 1)..=target_version {
        if !MIGRATIONS.iter().any(|m| m.version == version) {
            bail!(
                "Migration {version} is missing but required to migrate from version {current_version} to {target_version}"
            );
        }
    }

    Ok(())
}
