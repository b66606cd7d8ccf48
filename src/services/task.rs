use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::query::{
    parse_timestamp, Condition, ListSpec, Page, PageWindow, Predicate, Scalar, SortDirection,
    SortKey,
};
use crate::services::parse_uuid;
use crate::store::models::{
    Project, ProjectRef, Task, TaskPriority, TaskStatus, TaskView, User, UserRef,
};
use crate::store::{Collection, Document};

const SORTABLE: &[(&str, &str)] = &[
    ("orderNo", "order_no"),
    ("createdAt", "created_at"),
    ("dueDate", "due_date"),
    ("title", "title"),
    ("status", "status"),
    ("priority", "priority"),
];
// Project-scoped listings default to board order, oldest-style ascending.
const DEFAULT_SORT: SortKey = SortKey::new("order_no", SortDirection::Asc);

/// Filters for the flat task listing. Filter-only: no pagination or sort
/// parameters on this endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListParams {
    pub assign_to: Option<String>,
    pub created_by: Option<String>,
    pub project: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
}

/// Parameters for the project-scoped task listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTaskParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assign_to: Option<String>,
    pub due_date: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub project: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub assign_to: Option<Uuid>,
    pub order_no: Option<i64>,
}

pub struct TaskService {
    tasks: Collection<Task>,
    projects: Collection<Project>,
    users: Collection<User>,
}

impl TaskService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            tasks: Collection::new("tasks", pool.clone()),
            projects: Collection::new("projects", pool.clone()),
            users: Collection::new("users", pool),
        }
    }

    /// Create a task. Referential checks run before any write: the project
    /// must exist, and so must the assignee when one is given.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        created_by: Uuid,
        title: String,
        description: String,
        status: Option<String>,
        priority: Option<String>,
        due_date: Option<DateTime<Utc>>,
        project: Uuid,
        assign_to: Option<Uuid>,
    ) -> Result<TaskView, ApiError> {
        let status = match status {
            Some(raw) => parse_status(&raw)?,
            None => TaskStatus::Pending,
        };
        let priority = match priority {
            Some(raw) => parse_priority(&raw)?,
            None => TaskPriority::Medium,
        };

        if !self.projects.exists_by_id(project).await? {
            return Err(ApiError::not_found("Project not found"));
        }
        if let Some(assignee) = assign_to {
            if !self.users.exists_by_id(assignee).await? {
                return Err(ApiError::not_found("Assigned user not found"));
            }
        }

        // Append to the project's board order.
        let mut scoped = Predicate::new();
        scoped.and(Condition::Eq("project", Scalar::Uuid(project)));
        let order_no = self.tasks.count(&scoped).await? + 1;

        let doc = Document::new()
            .set("id", Uuid::new_v4())
            .set("title", title)
            .set("description", description)
            .set("status", status.as_str())
            .set("priority", priority.as_str())
            .maybe("due_date", due_date)
            .set("project", project)
            .set("created_by", created_by)
            .maybe("assign_to", assign_to)
            .set("order_no", order_no)
            .set("created_at", Utc::now());
        let task = self.tasks.insert(doc).await?;
        self.populate_one(task).await
    }

    /// Flat listing across projects; equality filters only, `dueDate`
    /// meaning "due on or before".
    pub async fn list(&self, params: &TaskListParams) -> Result<Vec<TaskView>, ApiError> {
        let predicate = build_flat_predicate(params)?;
        let tasks = self.tasks.find(&ListSpec::filtered(predicate)).await?;
        self.populate(tasks).await
    }

    pub async fn get(&self, id: Uuid) -> Result<TaskView, ApiError> {
        let task = self
            .tasks
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Task not found"))?;
        self.populate_one(task).await
    }

    /// Paginated listing of one project's tasks. The project is checked
    /// first so an unknown id reports NotFound rather than an empty page.
    pub async fn list_by_project(
        &self,
        project_id: Uuid,
        params: &ProjectTaskParams,
    ) -> Result<Page<TaskView>, ApiError> {
        if !self.projects.exists_by_id(project_id).await? {
            return Err(ApiError::not_found("Project not found"));
        }

        let predicate = build_project_predicate(project_id, params)?;
        let order = SortKey::from_raw(
            params.sort_by.as_deref(),
            params.sort_order.as_deref(),
            SORTABLE,
            DEFAULT_SORT,
        );
        let window = PageWindow::from_raw(params.page.as_deref(), params.limit.as_deref());
        let spec = ListSpec {
            predicate: predicate.clone(),
            order: Some(order),
            page: Some(window),
        };
        let data = self.tasks.find(&spec).await?;
        let total = self.tasks.count(&predicate).await?;
        let views = self.populate(data).await?;
        Ok(Page::new(views, total, &window))
    }

    pub async fn update(&self, id: Uuid, update: TaskUpdate) -> Result<TaskView, ApiError> {
        let status = update.status.as_deref().map(parse_status).transpose()?;
        let priority = update.priority.as_deref().map(parse_priority).transpose()?;

        if let Some(project) = update.project {
            if !self.projects.exists_by_id(project).await? {
                return Err(ApiError::not_found("Project not found"));
            }
        }
        if let Some(created_by) = update.created_by {
            if !self.users.exists_by_id(created_by).await? {
                return Err(ApiError::not_found("CreatedBy user not found"));
            }
        }
        if let Some(assign_to) = update.assign_to {
            if !self.users.exists_by_id(assign_to).await? {
                return Err(ApiError::not_found("AssignedTo user not found"));
            }
        }

        let doc = Document::new()
            .maybe("title", update.title)
            .maybe("description", update.description)
            .maybe("status", status.map(|s| s.as_str()))
            .maybe("priority", priority.map(|p| p.as_str()))
            .maybe("due_date", update.due_date)
            .maybe("project", update.project)
            .maybe("created_by", update.created_by)
            .maybe("assign_to", update.assign_to)
            .maybe("order_no", update.order_no);
        let task = self
            .tasks
            .update_by_id(id, doc)
            .await?
            .ok_or_else(|| ApiError::not_found("Task not found"))?;
        self.populate_one(task).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<Task, ApiError> {
        self.tasks
            .delete_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Task not found"))
    }

    async fn populate_one(&self, task: Task) -> Result<TaskView, ApiError> {
        Ok(self.populate(vec![task]).await?.remove(0))
    }

    /// Expand project / created_by / assign_to references with two batched
    /// lookups.
    async fn populate(&self, tasks: Vec<Task>) -> Result<Vec<TaskView>, ApiError> {
        let mut project_ids: Vec<Uuid> = tasks.iter().map(|t| t.project).collect();
        project_ids.sort_unstable();
        project_ids.dedup();

        let mut user_ids: Vec<Uuid> = tasks.iter().map(|t| t.created_by).collect();
        user_ids.extend(tasks.iter().filter_map(|t| t.assign_to));
        user_ids.sort_unstable();
        user_ids.dedup();

        let projects = self.projects.find_ids(&project_ids).await?;
        let project_refs: HashMap<Uuid, ProjectRef> =
            projects.iter().map(|p| (p.id, ProjectRef::from(p))).collect();

        let users = self.users.find_ids(&user_ids).await?;
        let user_refs: HashMap<Uuid, UserRef> =
            users.iter().map(|u| (u.id, UserRef::from(u))).collect();

        Ok(tasks
            .into_iter()
            .map(|t| TaskView {
                id: t.id,
                title: t.title,
                description: t.description,
                status: t.status,
                priority: t.priority,
                due_date: t.due_date,
                project: project_refs.get(&t.project).cloned(),
                created_by: user_refs.get(&t.created_by).cloned(),
                assign_to: t.assign_to.and_then(|a| user_refs.get(&a).cloned()),
                order_no: t.order_no,
                created_at: t.created_at,
            })
            .collect())
    }
}

fn parse_status(raw: &str) -> Result<TaskStatus, ApiError> {
    TaskStatus::parse(raw).ok_or_else(|| ApiError::bad_request("Invalid status value"))
}

fn parse_priority(raw: &str) -> Result<TaskPriority, ApiError> {
    TaskPriority::parse(raw).ok_or_else(|| ApiError::bad_request("Invalid priority value"))
}

fn parse_date_param(raw: &str, field: &str) -> Result<DateTime<Utc>, ApiError> {
    parse_timestamp(raw).ok_or_else(|| ApiError::bad_request(format!("Invalid {} value", field)))
}

fn build_flat_predicate(params: &TaskListParams) -> Result<Predicate, ApiError> {
    let mut predicate = Predicate::new();
    if let Some(raw) = &params.assign_to {
        predicate.and(Condition::Eq("assign_to", parse_uuid(raw, "assignTo")?.into()));
    }
    if let Some(raw) = &params.created_by {
        predicate.and(Condition::Eq("created_by", parse_uuid(raw, "createdBy")?.into()));
    }
    if let Some(raw) = &params.project {
        predicate.and(Condition::Eq("project", parse_uuid(raw, "project")?.into()));
    }
    if let Some(status) = &params.status {
        predicate.and(Condition::Eq("status", Scalar::from(status.as_str())));
    }
    if let Some(priority) = &params.priority {
        predicate.and(Condition::Eq("priority", Scalar::from(priority.as_str())));
    }
    if let Some(raw) = &params.due_date {
        // Flat listing: tasks due on or before the given date.
        predicate.and(Condition::Lte("due_date", parse_date_param(raw, "dueDate")?.into()));
    }
    Ok(predicate)
}

fn build_project_predicate(
    project_id: Uuid,
    params: &ProjectTaskParams,
) -> Result<Predicate, ApiError> {
    let mut predicate = Predicate::new();
    predicate.and(Condition::Eq("project", Scalar::Uuid(project_id)));
    if let Some(status) = &params.status {
        predicate.and(Condition::Eq("status", Scalar::from(status.as_str())));
    }
    if let Some(priority) = &params.priority {
        predicate.and(Condition::Eq("priority", Scalar::from(priority.as_str())));
    }
    if let Some(raw) = &params.assign_to {
        predicate.and(Condition::Eq("assign_to", parse_uuid(raw, "assignTo")?.into()));
    }
    if let Some(raw) = &params.due_date {
        // Project-scoped listing: exact-date filter.
        predicate.and(Condition::Eq("due_date", parse_date_param(raw, "dueDate")?.into()));
    }
    if let Some(s) = &params.search {
        predicate.search(&["title", "description"], s);
    }
    Ok(predicate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_due_date_means_on_or_before() {
        let params = TaskListParams {
            due_date: Some("2024-06-01".into()),
            ..Default::default()
        };
        let predicate = build_flat_predicate(&params).unwrap();
        let (sql, _) = predicate.to_sql(0);
        assert_eq!(sql, "\"due_date\" <= $1");
    }

    #[test]
    fn project_due_date_is_exact_match() {
        let params = ProjectTaskParams {
            due_date: Some("2024-06-01".into()),
            ..Default::default()
        };
        let predicate = build_project_predicate(Uuid::new_v4(), &params).unwrap();
        let (sql, _) = predicate.to_sql(0);
        assert_eq!(sql, "\"project\" = $1 AND \"due_date\" = $2");
    }

    #[test]
    fn malformed_filter_ids_are_validation_failures() {
        let params = TaskListParams {
            assign_to: Some("bogus".into()),
            ..Default::default()
        };
        let err = build_flat_predicate(&params).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn project_listing_defaults_to_board_order_ascending() {
        let key = SortKey::from_raw(None, None, SORTABLE, DEFAULT_SORT);
        assert_eq!(key.column, "order_no");
        assert_eq!(key.direction, SortDirection::Asc);
    }

    #[test]
    fn status_enum_membership_is_validated() {
        assert!(parse_status("done").is_ok());
        let err = parse_status("archived").unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Invalid status value");
    }

    #[test]
    fn search_spans_title_and_description() {
        let params = ProjectTaskParams {
            search: Some("login".into()),
            ..Default::default()
        };
        let predicate = build_project_predicate(Uuid::new_v4(), &params).unwrap();
        let (sql, _) = predicate.to_sql(0);
        assert!(sql.ends_with("(\"title\" ILIKE $2 OR \"description\" ILIKE $3)"));
    }
}
