//! Planner use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into caller-facing operations.
//! - Scope each operation to one short-lived transaction.
//!
//! # Invariants
//! - Every operation that touches a user's tasks ensures the user first,
//!   inside the same transaction.
//! - Mutations either commit fully or not at all.

pub mod dashboard_service;
pub mod recommendation_service;
pub mod task_service;
pub mod user_service;

use crate::model::validation::{require_user_id, ValidationError};
use crate::repo::RepoError;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error surfaced by planner services.
#[derive(Debug)]
pub enum ServiceError {
    /// Caller input rejected; nothing was written.
    Validation(ValidationError),
    /// Storage failure; the operation was rolled back.
    Repo(RepoError),
    /// Write succeeded but the read-back did not match.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid request: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent planner state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

/// Opens the write transaction every operation runs in.
///
/// `Immediate` takes the write lock up front, so lazy user creation inside an
/// otherwise read-only call never has to upgrade a shared lock.
pub(crate) fn begin_write(conn: &mut Connection) -> ServiceResult<Transaction<'_>> {
    Ok(conn.transaction_with_behavior(TransactionBehavior::Immediate)?)
}

pub(crate) fn user_key(user_id: &str) -> ServiceResult<&str> {
    Ok(require_user_id(user_id)?)
}
