//! Explicit dashboard snapshot cache.
//!
//! # Responsibility
//! - Hold the last assembled dashboard per user for transport layers.
//!
//! # Invariants
//! - Entries change only at refresh points: `refresh`, a miss in
//!   `get_or_load`, `invalidate` and `clear`.
//! - The cache is an owned value; nothing here is process-global.
//! - Keys are user ids exactly as supplied.
//!
//! # Usage
//! - One-shot front ends such as `navigaite` build a fresh cache per
//!   invocation, so they only ever go through `refresh` after a mutation.
//! - Hits from `get` and `get_or_load` pay off for long-lived callers that
//!   keep one cache across many operations.

use crate::service::dashboard_service::{load_dashboard, Dashboard};
use crate::service::{ServiceError, ServiceResult};
use log::debug;
use rusqlite::Connection;
use std::collections::HashMap;

/// Per-user dashboard snapshots.
#[derive(Debug, Default)]
pub struct DashboardCache {
    entries: HashMap<String, Dashboard>,
}

impl DashboardCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached snapshot without touching storage.
    pub fn get(&self, user_id: &str) -> Option<&Dashboard> {
        self.entries.get(user_id)
    }

    /// Returns the cached snapshot, loading it on a miss.
    pub fn get_or_load(
        &mut self,
        conn: &mut Connection,
        user_id: &str,
    ) -> ServiceResult<&Dashboard> {
        if !self.entries.contains_key(user_id) {
            debug!("event=dashboard_cache module=cache status=miss");
            return self.refresh(conn, user_id);
        }
        self.cached(user_id)
    }

    /// Reloads the snapshot from storage. Call after every mutation.
    pub fn refresh(&mut self, conn: &mut Connection, user_id: &str) -> ServiceResult<&Dashboard> {
        let dashboard = load_dashboard(conn, user_id)?;
        let key = dashboard.user.id.clone();
        debug!(
            "event=dashboard_cache module=cache status=refreshed tasks={}",
            dashboard.tasks.len()
        );
        self.entries.insert(key.clone(), dashboard);
        self.cached(&key)
    }

    fn cached(&self, key: &str) -> ServiceResult<&Dashboard> {
        self.entries
            .get(key)
            .ok_or(ServiceError::InconsistentState("dashboard cache entry missing"))
    }

    pub fn invalidate(&mut self, user_id: &str) -> bool {
        self.entries.remove(user_id).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
