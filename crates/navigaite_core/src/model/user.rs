//! Student profile record.
//!
//! # Invariants
//! - One record per identity, created lazily with [`DEFAULT_USER_NAME`].
//! - `needs_recalc` is true whenever profile or task state changed since the
//!   agent last stored recommendations.

use crate::model::validation::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder display name for lazily created users.
pub const DEFAULT_USER_NAME: &str = "New Student";

const GPA_RANGE: std::ops::RangeInclusive<f64> = 0.0..=5.0;
const SAT_RANGE: std::ops::RangeInclusive<i64> = 400..=1600;

/// Persisted user profile plus the stale-recommendation flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub gpa: Option<f64>,
    pub sat: Option<i64>,
    pub intended_major: Option<String>,
    pub financial_need: Option<String>,
    pub interests: Vec<String>,
    pub extracurriculars: Vec<String>,
    pub needs_recalc: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Builds the default profile inserted on first reference to `id`.
    pub fn new_default(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: DEFAULT_USER_NAME.to_string(),
            gpa: None,
            sat: None,
            intended_major: None,
            financial_need: None,
            interests: Vec::new(),
            extracurriculars: Vec::new(),
            needs_recalc: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial profile update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub gpa: Option<f64>,
    pub sat: Option<i64>,
    pub intended_major: Option<String>,
    pub financial_need: Option<String>,
    pub interests: Option<Vec<String>>,
    pub extracurriculars: Option<Vec<String>>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ValidationError::EmptyName);
            }
        }
        if let Some(gpa) = self.gpa {
            if !GPA_RANGE.contains(&gpa) {
                return Err(ValidationError::GpaOutOfRange(gpa));
            }
        }
        if let Some(sat) = self.sat {
            if !SAT_RANGE.contains(&sat) {
                return Err(ValidationError::SatOutOfRange(sat));
            }
        }
        Ok(())
    }

    /// Applies the provided fields onto `user`. List entries are trimmed and
    /// blank entries dropped.
    pub fn apply_to(&self, user: &mut UserRecord) {
        if let Some(name) = &self.name {
            user.name = name.trim().to_string();
        }
        if self.gpa.is_some() {
            user.gpa = self.gpa;
        }
        if self.sat.is_some() {
            user.sat = self.sat;
        }
        if let Some(major) = &self.intended_major {
            user.intended_major = Some(major.trim().to_string());
        }
        if let Some(need) = &self.financial_need {
            user.financial_need = Some(need.trim().to_string());
        }
        if let Some(interests) = &self.interests {
            user.interests = clean_list(interests);
        }
        if let Some(extracurriculars) = &self.extracurriculars {
            user.extracurriculars = clean_list(extracurriculars);
        }
    }
}

fn clean_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}
