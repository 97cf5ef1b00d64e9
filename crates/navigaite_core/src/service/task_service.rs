//! Task registry service.
//!
//! # Responsibility
//! - Create, list and toggle checklist tasks for one user.
//! - Mark recommendations stale on every task mutation.
//!
//! # Invariants
//! - Manual tasks always carry `TaskSource::User` and start not done.
//! - Toggle only affects `(task_id, user_id)`; a missing or foreign task is
//!   reported as `false`.

use crate::model::now_timestamp;
use crate::model::task::{NewTask, Task, TaskSource};
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::service::{begin_write, user_key, ServiceError, ServiceResult};
use rusqlite::Connection;
use uuid::Uuid;

/// Use-case service for user checklist tasks.
pub struct TaskService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> TaskService<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Lists every task of the user with resources attached.
    pub fn list_tasks(&mut self, user_id: &str) -> ServiceResult<Vec<Task>> {
        let user_id = user_key(user_id)?;
        let tx = begin_write(self.conn)?;
        SqliteUserRepository::new(&tx).ensure_user(user_id, now_timestamp())?;
        let tasks = SqliteTaskRepository::new(&tx).list_tasks(user_id)?;
        tx.commit()?;
        Ok(tasks)
    }

    /// Creates a manual task.
    ///
    /// # Errors
    /// - `ServiceError::Validation` when the title is blank.
    pub fn add_task(&mut self, user_id: &str, request: &NewTask) -> ServiceResult<Task> {
        let user_id = user_key(user_id)?;
        request.validate()?;

        let now = now_timestamp();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: request.title.trim().to_string(),
            note: request.note.clone(),
            due_date: request.due_date.clone(),
            done: false,
            source: TaskSource::User,
            created_at: now,
            completed_at: None,
            resources: Vec::new(),
        };

        let tx = begin_write(self.conn)?;
        let users = SqliteUserRepository::new(&tx);
        users.ensure_user(user_id, now)?;
        SqliteTaskRepository::new(&tx).insert_task(&task)?;
        users.set_needs_recalc(user_id, true, now)?;
        tx.commit()?;
        Ok(task)
    }

    /// Sets the done flag of one task.
    ///
    /// Returns whether a task matched. The stale flag is set either way.
    pub fn toggle_task(&mut self, user_id: &str, task_id: &str, done: bool) -> ServiceResult<bool> {
        let user_id = user_key(user_id)?;
        let now = now_timestamp();

        let tx = begin_write(self.conn)?;
        let users = SqliteUserRepository::new(&tx);
        users.ensure_user(user_id, now)?;
        let updated = SqliteTaskRepository::new(&tx).set_done(user_id, task_id, done, now)?;
        users.set_needs_recalc(user_id, true, now)?;
        tx.commit()?;
        Ok(updated)
    }

    /// Reads one task owned by the user.
    pub fn get_task(&self, user_id: &str, task_id: &str) -> ServiceResult<Option<Task>> {
        let user_id = user_key(user_id)?;
        SqliteTaskRepository::new(self.conn)
            .get_task(user_id, task_id)
            .map_err(ServiceError::from)
    }
}
