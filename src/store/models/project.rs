//! # Schema
//!
//! ```sql
//! CREATE TABLE projects (
//!     id UUID PRIMARY KEY,
//!     name VARCHAR(255) NOT NULL,
//!     description TEXT NOT NULL,
//!     created_by UUID NOT NULL,
//!     members UUID[] NOT NULL DEFAULT '{}',
//!     is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::user::UserRef;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_by: Uuid,
    pub members: Vec<Uuid>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Shallow projection used when a project is referenced from a task.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRef {
    pub id: Uuid,
    pub name: String,
}

impl From<&Project> for ProjectRef {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            name: project.name.clone(),
        }
    }
}

/// Read shape with references expanded. A dangling reference expands to
/// None; the referenced entity's lifecycle is independent of the project.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_by: Option<UserRef>,
    pub members: Vec<UserRef>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}
