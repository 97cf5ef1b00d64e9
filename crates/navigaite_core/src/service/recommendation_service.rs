//! Recommendation synchronizer.
//!
//! # Responsibility
//! - Replace all agent-generated tasks of a user with a new batch.
//! - Acknowledge agent processing by clearing the stale flag.
//!
//! # Invariants
//! - Delete-old + insert-new + flag clear commit as one transaction; a
//!   partial replacement is never visible.
//! - `TaskSource::User` tasks are never touched.

use crate::model::now_timestamp;
use crate::model::task::{RecommendationItem, Resource, Task, TaskSource};
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::service::{begin_write, user_key, ServiceResult};
use chrono::{DateTime, Utc};
use log::{error, info};
use rusqlite::Connection;
use serde::Serialize;
use std::time::Instant;
use uuid::Uuid;

/// Outcome of one recommendation replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationBatch {
    pub stored_count: usize,
    /// Newly stored agent tasks, resources attached.
    pub tasks: Vec<Task>,
}

/// Use-case service for agent recommendation sync.
pub struct RecommendationService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> RecommendationService<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Clears `needs_recalc` when set. Unknown users are not created and
    /// report `false`.
    pub fn clear_needs_recalc(&mut self, user_id: &str) -> ServiceResult<bool> {
        let user_id = user_key(user_id)?;
        let tx = begin_write(self.conn)?;
        let cleared = SqliteUserRepository::new(&tx).clear_needs_recalc(user_id, now_timestamp())?;
        tx.commit()?;
        Ok(cleared)
    }

    /// Atomically replaces the user's agent tasks with `items`.
    ///
    /// Items are validated before the transaction opens. Any storage error
    /// (for example a supplied id colliding with an existing task) rolls back
    /// the whole replacement, leaving prior tasks and the flag untouched.
    pub fn set_recommendations(
        &mut self,
        user_id: &str,
        items: &[RecommendationItem],
    ) -> ServiceResult<RecommendationBatch> {
        let user_id = user_key(user_id)?;
        for item in items {
            item.validate()?;
        }

        let started_at = Instant::now();
        let now = now_timestamp();
        let tasks: Vec<Task> = items
            .iter()
            .map(|item| build_llm_task(user_id, item, now))
            .collect();

        let result = replace_llm_tasks(self.conn, user_id, &tasks, now);
        let duration_ms = started_at.elapsed().as_millis();
        match &result {
            Ok(replaced) => info!(
                "event=recommendations_set module=service status=ok replaced={} stored={} duration_ms={}",
                replaced,
                tasks.len(),
                duration_ms
            ),
            Err(err) => error!(
                "event=recommendations_set module=service status=error duration_ms={} error={}",
                duration_ms, err
            ),
        }
        result?;

        Ok(RecommendationBatch {
            stored_count: tasks.len(),
            tasks,
        })
    }
}

fn replace_llm_tasks(
    conn: &mut Connection,
    user_id: &str,
    tasks: &[Task],
    now: DateTime<Utc>,
) -> ServiceResult<usize> {
    let tx = begin_write(conn)?;
    let users = SqliteUserRepository::new(&tx);
    let task_repo = SqliteTaskRepository::new(&tx);

    users.ensure_user(user_id, now)?;
    let replaced = task_repo.delete_tasks_by_source(user_id, TaskSource::Llm)?;
    for task in tasks {
        task_repo.insert_task(task)?;
    }
    users.set_needs_recalc(user_id, false, now)?;
    tx.commit()?;
    Ok(replaced)
}

fn build_llm_task(user_id: &str, item: &RecommendationItem, now: DateTime<Utc>) -> Task {
    let task_id = item.resolved_id();
    let resources = item
        .resources
        .iter()
        .map(|resource| Resource {
            id: Uuid::new_v4().to_string(),
            task_id: task_id.clone(),
            title: resource.title.trim().to_string(),
            url: resource.url.trim().to_string(),
            description: resource.description.clone(),
        })
        .collect();

    Task {
        id: task_id,
        user_id: user_id.to_string(),
        title: item.title.trim().to_string(),
        note: item.note.clone(),
        due_date: item.due_date.clone(),
        done: false,
        source: TaskSource::Llm,
        created_at: now,
        completed_at: None,
        resources,
    }
}
