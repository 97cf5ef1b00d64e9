//! One-time adoption of unversioned planner stores.
//!
//! # Responsibility
//! - Bring a `user_version = 0` store that already holds planner tables to
//!   the shape of [`ADOPTED_VERSION`] without dropping rows.
//!
//! # Invariants
//! - Only columns that are missing get added.
//! - `llm_needs_recalc` values carry over into `needs_recalc`.
//! - Timestamps without an offset are treated as UTC and rewritten with `Z`.
//! - Runs at most once per store; the caller stamps the version afterwards.

use crate::db::DbResult;
use crate::model::user::DEFAULT_USER_NAME;
use log::info;
use rusqlite::Connection;

/// Schema version an adopted store is equivalent to.
pub(super) const ADOPTED_VERSION: u32 = 2;

const NOW_SQL: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

const USER_COLUMNS: &[(&str, &str)] = &[
    ("name", "TEXT"),
    ("gpa", "REAL"),
    ("sat", "INTEGER"),
    ("intended_major", "TEXT"),
    ("financial_need", "TEXT"),
    ("needs_recalc", "INTEGER NOT NULL DEFAULT 1"),
    ("interests", "TEXT NOT NULL DEFAULT '[]'"),
    ("extracurriculars", "TEXT NOT NULL DEFAULT '[]'"),
    ("created_at", "TEXT"),
    ("updated_at", "TEXT"),
];

const TIMESTAMP_COLUMNS: &[(&str, &str)] = &[
    ("users", "created_at"),
    ("users", "updated_at"),
    ("tasks", "created_at"),
    ("tasks", "completed_at"),
];

/// Returns whether the unversioned store already has planner tables.
pub(super) fn needs_adoption(conn: &Connection) -> DbResult<bool> {
    table_exists(conn, "users")
}

/// Adopts an existing unversioned store. `init_sql` creates any planner
/// table the store is still missing.
pub(super) fn adopt_existing_store(conn: &Connection, init_sql: &str) -> DbResult<()> {
    conn.execute_batch(init_sql)?;

    let existing = table_columns(conn, "users")?;
    let mut added = 0;
    for (column, definition) in USER_COLUMNS {
        if !existing.iter().any(|name| name.as_str() == *column) {
            conn.execute_batch(&format!(
                "ALTER TABLE users ADD COLUMN {column} {definition};"
            ))?;
            added += 1;
        }
    }

    if existing.iter().any(|name| name == "llm_needs_recalc") {
        conn.execute_batch(
            "UPDATE users SET needs_recalc = COALESCE(llm_needs_recalc, 1);",
        )?;
    }

    conn.execute_batch(&format!(
        "UPDATE users SET name = '{DEFAULT_USER_NAME}' WHERE name IS NULL;
         UPDATE users SET interests = '[]' WHERE interests IS NULL OR interests = '';
         UPDATE users SET extracurriculars = '[]'
            WHERE extracurriculars IS NULL OR extracurriculars = '';
         UPDATE users SET needs_recalc = 1 WHERE needs_recalc IS NULL;
         UPDATE users SET created_at = {NOW_SQL} WHERE created_at IS NULL;
         UPDATE users SET updated_at = created_at WHERE updated_at IS NULL;
         UPDATE tasks SET title = '' WHERE title IS NULL;
         UPDATE tasks SET done = 0 WHERE done IS NULL;
         UPDATE tasks SET source = 'user' WHERE source IS NULL OR source NOT IN ('user', 'llm');
         UPDATE tasks SET created_at = {NOW_SQL} WHERE created_at IS NULL;
         UPDATE resources SET title = '' WHERE title IS NULL;
         UPDATE resources SET url = '' WHERE url IS NULL;"
    ))?;

    for (table, column) in TIMESTAMP_COLUMNS {
        conn.execute_batch(&mark_naive_as_utc(table, column))?;
    }

    info!(
        "event=db_adopt module=db status=ok added_columns={} version={}",
        added, ADOPTED_VERSION
    );
    Ok(())
}

fn mark_naive_as_utc(table: &str, column: &str) -> String {
    format!(
        "UPDATE {table}
         SET {column} = {column} || 'Z'
         WHERE {column} IS NOT NULL
           AND {column} NOT LIKE '%Z'
           AND substr({column}, -6, 1) NOT IN ('+', '-');"
    )
}

fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get(1)?);
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::mark_naive_as_utc;
    use rusqlite::Connection;

    #[test]
    fn only_offsetless_timestamps_gain_utc_suffix() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE t (ts TEXT);
             INSERT INTO t VALUES
                ('2025-01-01T12:00:00.123456'),
                ('2025-01-01T12:00:00'),
                ('2025-01-01T12:00:00.000Z'),
                ('2025-01-01T12:00:00+02:00'),
                (NULL);",
        )
        .unwrap();
        conn.execute_batch(&mark_naive_as_utc("t", "ts")).unwrap();

        let mut stmt = conn.prepare("SELECT ts FROM t ORDER BY rowid;").unwrap();
        let values = stmt
            .query_map([], |row| row.get::<_, Option<String>>(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(
            values,
            vec![
                Some("2025-01-01T12:00:00.123456Z".to_string()),
                Some("2025-01-01T12:00:00Z".to_string()),
                Some("2025-01-01T12:00:00.000Z".to_string()),
                Some("2025-01-01T12:00:00+02:00".to_string()),
                None,
            ]
        );
    }
}
