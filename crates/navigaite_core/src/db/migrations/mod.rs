//! Ordered schema migrations for the planner store.
//!
//! # Responsibility
//! - Register schema steps in strictly increasing version order.
//! - Apply every pending step inside one transaction.
//!
//! # Invariants
//! - `version` values are monotonic and never reused.
//! - Column additions are new numbered steps, not runtime introspection.
//! - An unversioned store that already holds planner tables is adopted once
//!   (see `adopt`) instead of replaying steps that would collide with it.

mod adopt;

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    Migration {
        version: 2,
        name: "profile_lists",
        sql: include_str!("0002_profile_lists.sql"),
    },
    Migration {
        version: 3,
        name: "task_indexes",
        sql: include_str!("0003_task_indexes.sql"),
    },
];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the connection schema up to [`latest_version`].
///
/// A no-op when the database is already current, so it is safe to run on
/// every open.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current = current_user_version(conn)?;
    let latest = latest_version();

    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }
    if current == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    let mut applied = current;
    if current == 0 && adopt::needs_adoption(&tx)? {
        adopt::adopt_existing_store(&tx, MIGRATIONS[0].sql)?;
        applied = adopt::ADOPTED_VERSION;
        tx.execute_batch(&format!("PRAGMA user_version = {applied};"))?;
    }

    for migration in MIGRATIONS.iter().filter(|m| m.version > applied) {
        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
        info!(
            "event=db_migrate module=db status=applied version={} name={}",
            migration.version, migration.name
        );
    }
    tx.commit()?;

    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
