//! User repository: lazy creation, profile persistence, stale flag.
//!
//! # Invariants
//! - `ensure_user` inserts at most one row per identity.
//! - List columns hold JSON arrays of strings.

use crate::model::user::UserRecord;
use crate::model::{parse_timestamp, timestamp_to_db};
use crate::repo::{bool_to_int, int_to_bool, RepoError, RepoResult};
use chrono::{DateTime, Utc};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    name,
    gpa,
    sat,
    intended_major,
    financial_need,
    interests,
    extracurriculars,
    needs_recalc,
    created_at,
    updated_at
FROM users";

/// Repository interface for user rows.
pub trait UserRepository {
    /// Reads one user without creating it.
    fn get_user(&self, user_id: &str) -> RepoResult<Option<UserRecord>>;
    /// Returns the existing row or inserts the default profile.
    fn ensure_user(&self, user_id: &str, now: DateTime<Utc>) -> RepoResult<UserRecord>;
    /// Persists all profile fields of `user` (flag and timestamps included).
    fn save_profile(&self, user: &UserRecord) -> RepoResult<()>;
    /// Writes the flag unconditionally and bumps `updated_at`.
    fn set_needs_recalc(&self, user_id: &str, flag: bool, now: DateTime<Utc>) -> RepoResult<()>;
    /// Clears the flag only when set. Returns whether a row changed.
    fn clear_needs_recalc(&self, user_id: &str, now: DateTime<Utc>) -> RepoResult<bool>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn get_user(&self, user_id: &str) -> RepoResult<Option<UserRecord>> {
        let row = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
                [user_id],
                |row| Ok(read_user_row(row)),
            )
            .optional()?;
        row.transpose()
    }

    fn ensure_user(&self, user_id: &str, now: DateTime<Utc>) -> RepoResult<UserRecord> {
        if let Some(existing) = self.get_user(user_id)? {
            return Ok(existing);
        }

        let user = UserRecord::new_default(user_id, now);
        let created_at = timestamp_to_db(now);
        self.conn.execute(
            "INSERT INTO users (
                id,
                name,
                interests,
                extracurriculars,
                needs_recalc,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6);",
            params![
                user.id.as_str(),
                user.name.as_str(),
                encode_list(&user.interests)?,
                encode_list(&user.extracurriculars)?,
                bool_to_int(user.needs_recalc),
                created_at,
            ],
        )?;
        info!("event=user_created module=repo status=ok");

        Ok(user)
    }

    fn save_profile(&self, user: &UserRecord) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users
             SET
                name = ?2,
                gpa = ?3,
                sat = ?4,
                intended_major = ?5,
                financial_need = ?6,
                interests = ?7,
                extracurriculars = ?8,
                needs_recalc = ?9,
                updated_at = ?10
             WHERE id = ?1;",
            params![
                user.id.as_str(),
                user.name.as_str(),
                user.gpa,
                user.sat,
                user.intended_major.as_deref(),
                user.financial_need.as_deref(),
                encode_list(&user.interests)?,
                encode_list(&user.extracurriculars)?,
                bool_to_int(user.needs_recalc),
                timestamp_to_db(user.updated_at),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::InvalidData(format!(
                "profile save targeted missing user `{}`",
                user.id
            )));
        }
        Ok(())
    }

    fn set_needs_recalc(&self, user_id: &str, flag: bool, now: DateTime<Utc>) -> RepoResult<()> {
        self.conn.execute(
            "UPDATE users SET needs_recalc = ?2, updated_at = ?3 WHERE id = ?1;",
            params![user_id, bool_to_int(flag), timestamp_to_db(now)],
        )?;
        Ok(())
    }

    fn clear_needs_recalc(&self, user_id: &str, now: DateTime<Utc>) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE users
             SET needs_recalc = 0, updated_at = ?2
             WHERE id = ?1
               AND needs_recalc = 1;",
            params![user_id, timestamp_to_db(now)],
        )?;
        Ok(changed > 0)
    }
}

fn read_user_row(row: &Row<'_>) -> RepoResult<UserRecord> {
    Ok(UserRecord {
        id: row.get("id")?,
        name: row.get("name")?,
        gpa: row.get("gpa")?,
        sat: row.get("sat")?,
        intended_major: row.get("intended_major")?,
        financial_need: row.get("financial_need")?,
        interests: decode_list(&row.get::<_, String>("interests")?, "users.interests")?,
        extracurriculars: decode_list(
            &row.get::<_, String>("extracurriculars")?,
            "users.extracurriculars",
        )?,
        needs_recalc: int_to_bool(row.get("needs_recalc")?, "users.needs_recalc")?,
        created_at: read_timestamp(row, "created_at")?,
        updated_at: read_timestamp(row, "updated_at")?,
    })
}

pub(crate) fn read_timestamp(row: &Row<'_>, column: &str) -> RepoResult<DateTime<Utc>> {
    let text: String = row.get(column)?;
    parse_timestamp(&text)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid timestamp `{text}` in {column}")))
}

fn encode_list(values: &[String]) -> RepoResult<String> {
    serde_json::to_string(values)
        .map_err(|err| RepoError::InvalidData(format!("list encode failed: {err}")))
}

fn decode_list(text: &str, column: &str) -> RepoResult<Vec<String>> {
    serde_json::from_str(text)
        .map_err(|err| RepoError::InvalidData(format!("invalid list in {column}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::{decode_list, encode_list};

    #[test]
    fn list_columns_are_json_arrays() {
        let encoded = encode_list(&["chess".to_string(), "debate".to_string()]).unwrap();
        assert_eq!(encoded, r#"["chess","debate"]"#);
        assert_eq!(
            decode_list(&encoded, "users.interests").unwrap(),
            vec!["chess".to_string(), "debate".to_string()]
        );
    }

    #[test]
    fn malformed_list_is_invalid_data() {
        let err = decode_list("chess, debate", "users.interests").unwrap_err();
        assert!(err.to_string().contains("users.interests"));
    }
}
