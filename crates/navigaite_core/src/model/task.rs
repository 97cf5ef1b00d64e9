//! Checklist task and resource records.
//!
//! # Responsibility
//! - Define the task read model returned to callers (with resources attached).
//! - Define inbound payloads for manual tasks and agent recommendations.
//!
//! # Invariants
//! - `completed_at` is `Some` iff `done` is true.
//! - `TaskSource::Llm` tasks are owned by the recommendation synchronizer.

use crate::model::validation::{require_title, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable task identifier. Usually a UUID, but agent-supplied ids are kept
/// verbatim.
pub type TaskId = String;

/// Provenance of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSource {
    /// Created manually by the student.
    User,
    /// Generated by the recommendation agent.
    Llm,
}

impl TaskSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Llm => "llm",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "llm" => Some(Self::Llm),
            _ => None,
        }
    }
}

/// Link attached to an agent-generated task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub task_id: TaskId,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
}

/// Task read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub user_id: String,
    pub title: String,
    pub note: Option<String>,
    pub due_date: Option<String>,
    pub done: bool,
    pub source: TaskSource,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub resources: Vec<Resource>,
}

/// Manual task payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, alias = "due_date")]
    pub due_date: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            note: None,
            due_date: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_title(&self.title)
    }
}

/// One resource entry inside a recommendation item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResource {
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Agent-supplied suggestion for one task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationItem {
    /// Optional agent-chosen id. A fresh UUID is generated when absent.
    #[serde(default)]
    pub id: Option<TaskId>,
    pub title: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, alias = "due_date")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub resources: Vec<RecommendationResource>,
}

impl RecommendationItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_title(&self.title)?;
        for resource in &self.resources {
            if resource.url.trim().is_empty() {
                return Err(ValidationError::EmptyResourceUrl {
                    title: resource.title.clone(),
                });
            }
        }
        Ok(())
    }

    /// Supplied id when non-blank, otherwise a generated UUID.
    pub fn resolved_id(&self) -> TaskId {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_string)
    }
}
