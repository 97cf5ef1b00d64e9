//! User lifecycle service.
//!
//! # Invariants
//! - Users are created on first reference and never deleted.
//! - Any profile change marks recommendations stale.

use crate::model::now_timestamp;
use crate::model::user::{ProfileUpdate, UserRecord};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::service::{begin_write, user_key, ServiceResult};
use rusqlite::Connection;

/// Use-case service for user records.
pub struct UserService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> UserService<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Returns the user, inserting the default profile on first reference.
    pub fn ensure_user(&mut self, user_id: &str) -> ServiceResult<UserRecord> {
        let user_id = user_key(user_id)?;
        let tx = begin_write(self.conn)?;
        let user = SqliteUserRepository::new(&tx).ensure_user(user_id, now_timestamp())?;
        tx.commit()?;
        Ok(user)
    }

    /// Reads a user without creating it.
    pub fn get_user(&self, user_id: &str) -> ServiceResult<Option<UserRecord>> {
        let user_id = user_key(user_id)?;
        Ok(SqliteUserRepository::new(self.conn).get_user(user_id)?)
    }

    /// Applies a partial profile update and marks recommendations stale.
    pub fn update_profile(
        &mut self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> ServiceResult<UserRecord> {
        let user_id = user_key(user_id)?;
        update.validate()?;

        let now = now_timestamp();
        let tx = begin_write(self.conn)?;
        let repo = SqliteUserRepository::new(&tx);
        let mut user = repo.ensure_user(user_id, now)?;
        update.apply_to(&mut user);
        user.needs_recalc = true;
        user.updated_at = now;
        repo.save_profile(&user)?;
        tx.commit()?;
        Ok(user)
    }
}
