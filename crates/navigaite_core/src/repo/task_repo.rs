//! Task/resource repository.
//!
//! # Responsibility
//! - Persist tasks and their resources scoped to one owning user.
//! - Provide the bulk delete used by recommendation replacement.
//!
//! # Invariants
//! - Every query filters by `user_id`; foreign tasks are invisible.
//! - Resources are deleted before their task, never left dangling.
//! - Listing follows insertion order (`rowid`).

use crate::model::task::{Resource, Task, TaskSource};
use crate::model::timestamp_to_db;
use crate::repo::user_repo::read_timestamp;
use crate::repo::{bool_to_int, int_to_bool, RepoError, RepoResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    title,
    note,
    due_date,
    done,
    source,
    created_at,
    completed_at
FROM tasks";

/// Repository interface for checklist tasks.
pub trait TaskRepository {
    /// Lists all tasks of one user with resources, in insertion order.
    fn list_tasks(&self, user_id: &str) -> RepoResult<Vec<Task>>;
    /// Gets one task when it belongs to `user_id`.
    fn get_task(&self, user_id: &str, task_id: &str) -> RepoResult<Option<Task>>;
    /// Inserts the task row and every attached resource row.
    fn insert_task(&self, task: &Task) -> RepoResult<()>;
    /// Updates `done`/`completed_at` for `(task_id, user_id)`.
    /// Returns whether a row matched.
    fn set_done(
        &self,
        user_id: &str,
        task_id: &str,
        done: bool,
        now: DateTime<Utc>,
    ) -> RepoResult<bool>;
    /// Deletes every task of `source` for the user plus their resources.
    /// Returns the number of deleted tasks.
    fn delete_tasks_by_source(&self, user_id: &str, source: TaskSource) -> RepoResult<usize>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load_resources(&self, task_id: &str) -> RepoResult<Vec<Resource>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, task_id, title, url, description
             FROM resources
             WHERE task_id = ?1
             ORDER BY rowid ASC;",
        )?;
        let mut rows = stmt.query([task_id])?;
        let mut resources = Vec::new();
        while let Some(row) = rows.next()? {
            resources.push(Resource {
                id: row.get("id")?,
                task_id: row.get("task_id")?,
                title: row.get("title")?,
                url: row.get("url")?,
                description: row.get("description")?,
            });
        }
        Ok(resources)
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn list_tasks(&self, user_id: &str) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY rowid ASC;"
        ))?;
        let mut rows = stmt.query([user_id])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            let mut task = read_task_row(row)?;
            task.resources = self.load_resources(&task.id)?;
            tasks.push(task);
        }
        Ok(tasks)
    }

    fn get_task(&self, user_id: &str, task_id: &str) -> RepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE id = ?1
               AND user_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![task_id, user_id])?;
        if let Some(row) = rows.next()? {
            let mut task = read_task_row(row)?;
            task.resources = self.load_resources(&task.id)?;
            return Ok(Some(task));
        }
        Ok(None)
    }

    fn insert_task(&self, task: &Task) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO tasks (
                id,
                user_id,
                title,
                note,
                due_date,
                done,
                source,
                created_at,
                completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                task.id.as_str(),
                task.user_id.as_str(),
                task.title.as_str(),
                task.note.as_deref(),
                task.due_date.as_deref(),
                bool_to_int(task.done),
                task.source.as_str(),
                timestamp_to_db(task.created_at),
                task.completed_at.map(timestamp_to_db),
            ],
        )?;

        for resource in &task.resources {
            self.conn.execute(
                "INSERT INTO resources (id, task_id, title, url, description)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    resource.id.as_str(),
                    task.id.as_str(),
                    resource.title.as_str(),
                    resource.url.as_str(),
                    resource.description.as_deref(),
                ],
            )?;
        }
        Ok(())
    }

    fn set_done(
        &self,
        user_id: &str,
        task_id: &str,
        done: bool,
        now: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let completed_at = done.then(|| timestamp_to_db(now));
        let changed = self.conn.execute(
            "UPDATE tasks
             SET done = ?3, completed_at = ?4
             WHERE id = ?1
               AND user_id = ?2;",
            params![task_id, user_id, bool_to_int(done), completed_at],
        )?;
        Ok(changed > 0)
    }

    fn delete_tasks_by_source(&self, user_id: &str, source: TaskSource) -> RepoResult<usize> {
        self.conn.execute(
            "DELETE FROM resources
             WHERE task_id IN (
                SELECT id FROM tasks WHERE user_id = ?1 AND source = ?2
             );",
            params![user_id, source.as_str()],
        )?;
        let deleted = self.conn.execute(
            "DELETE FROM tasks WHERE user_id = ?1 AND source = ?2;",
            params![user_id, source.as_str()],
        )?;
        Ok(deleted)
    }
}

fn read_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let source_text: String = row.get("source")?;
    let source = TaskSource::parse(&source_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid task source `{source_text}` in tasks.source"))
    })?;
    let done = int_to_bool(row.get("done")?, "tasks.done")?;
    let completed_at = match row.get::<_, Option<String>>("completed_at")? {
        Some(_) => Some(read_timestamp(row, "completed_at")?),
        None => None,
    };

    Ok(Task {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        note: row.get("note")?,
        due_date: row.get("due_date")?,
        done,
        source,
        created_at: read_timestamp(row, "created_at")?,
        completed_at,
        resources: Vec::new(),
    })
}
