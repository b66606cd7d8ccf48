//! # Schema
//!
//! ```sql
//! CREATE TABLE tasks (
//!     id UUID PRIMARY KEY,
//!     title VARCHAR(255) NOT NULL,
//!     description TEXT NOT NULL,
//!     status VARCHAR(32) NOT NULL DEFAULT 'pending',
//!     priority VARCHAR(32) NOT NULL DEFAULT 'medium',
//!     due_date TIMESTAMPTZ,
//!     project UUID NOT NULL,
//!     created_by UUID NOT NULL,
//!     assign_to UUID,
//!     order_no BIGINT NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::project::ProjectRef;
use super::user::UserRef;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub due_date: Option<DateTime<Utc>>,
    pub project: Uuid,
    pub created_by: Uuid,
    pub assign_to: Option<Uuid>,
    pub order_no: i64,
    pub created_at: DateTime<Utc>,
}

/// Workflow state. Stored as text; membership is validated at the service
/// boundary, transition order is deliberately not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    InProgress,
    InReview,
    Done,
}

impl TaskStatus {
    pub const VALUES: [&'static str; 4] = ["pending", "inprogress", "inreview", "done"];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "inprogress" => Some(Self::InProgress),
            "inreview" => Some(Self::InReview),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "inprogress",
            Self::InReview => "inreview",
            Self::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub const VALUES: [&'static str; 3] = ["low", "medium", "high"];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Shallow projection used when a task is referenced from a comment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRef {
    pub id: Uuid,
    pub title: String,
}

impl From<&Task> for TaskRef {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub due_date: Option<DateTime<Utc>>,
    pub project: Option<ProjectRef>,
    pub created_by: Option<UserRef>,
    pub assign_to: Option<UserRef>,
    pub order_no: i64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_four_statuses_parse() {
        for raw in TaskStatus::VALUES {
            let status = TaskStatus::parse(raw).unwrap();
            assert_eq!(status.as_str(), raw);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(TaskStatus::parse("archived").is_none());
        assert!(TaskStatus::parse("Done").is_none());
        assert!(TaskStatus::parse("").is_none());
    }

    #[test]
    fn priority_parses_and_rejects() {
        assert_eq!(TaskPriority::parse("high"), Some(TaskPriority::High));
        assert!(TaskPriority::parse("urgent").is_none());
    }
}
