//! Dashboard assembler.
//!
//! Composes the user profile and full task list into one snapshot read in a
//! single transaction.

use crate::model::now_timestamp;
use crate::model::task::Task;
use crate::model::user::UserRecord;
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::service::{begin_write, user_key, ServiceResult};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// Read view returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub user: UserRecord,
    pub tasks: Vec<Task>,
}

impl Dashboard {
    pub fn pending_count(&self) -> usize {
        self.tasks.iter().filter(|task| !task.done).count()
    }
}

/// Use-case service for dashboard reads.
pub struct DashboardService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> DashboardService<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Returns `{user, tasks}`. Only side effect is lazy user creation.
    pub fn get_dashboard(&mut self, user_id: &str) -> ServiceResult<Dashboard> {
        load_dashboard(self.conn, user_id)
    }
}

pub(crate) fn load_dashboard(conn: &mut Connection, user_id: &str) -> ServiceResult<Dashboard> {
    let user_id = user_key(user_id)?;
    let tx = begin_write(conn)?;
    let user = SqliteUserRepository::new(&tx).ensure_user(user_id, now_timestamp())?;
    let tasks = SqliteTaskRepository::new(&tx).list_tasks(user_id)?;
    tx.commit()?;
    Ok(Dashboard { user, tasks })
}
