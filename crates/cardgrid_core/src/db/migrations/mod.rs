//! Ordered schema migrations for the layout database.
//!
//! Versions are strictly increasing and mirrored to `PRAGMA user_version`.
//! Pending migrations run inside one immediate transaction.

use crate::db::{DbError, DbResult};
use rusqlite::{Connection, TransactionBehavior};

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: include_str!("0001_card_layouts.sql"),
    },
    Migration {
        version: 2,
        sql: include_str!("0002_field_value_sets.sql"),
    },
];

/// Latest schema version this binary can read and write.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies every migration newer than the connection's `user_version`.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let latest = latest_version();
    let current = ensure_supported(current_user_version(conn)?, latest)?;
    if current == latest {
        return Ok(());
    }

    // Re-read under the write lock; a concurrent opener may have migrated.
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let current = ensure_supported(current_user_version(&tx)?, latest)?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        tx.execute_batch(migration.sql)
            .and_then(|()| {
                tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))
            })
            .map_err(|source| DbError::MigrationFailed {
                version: migration.version,
                source,
            })?;
    }
    tx.commit()?;
    Ok(())
}

fn ensure_supported(current: u32, latest: u32) -> DbResult<u32> {
    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }
    Ok(current)
}

pub(crate) fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
