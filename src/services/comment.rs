use std::collections::HashMap;

use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::query::{
    parse_timestamp, Condition, ListSpec, Page, PageWindow, Predicate, SortDirection, SortKey,
};
use crate::services::parse_uuid;
use crate::store::models::{Comment, CommentView, Task, TaskRef, User, UserRef};
use crate::store::{Collection, Document};

const SORTABLE: &[(&str, &str)] = &[("createdAt", "created_at")];
const DEFAULT_SORT: SortKey = SortKey::new("created_at", SortDirection::Desc);

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub task_id: Option<String>,
    pub user_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentUpdate {
    pub content: Option<String>,
    pub task_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

pub struct CommentService {
    comments: Collection<Comment>,
    tasks: Collection<Task>,
    users: Collection<User>,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            comments: Collection::new("comments", pool.clone()),
            tasks: Collection::new("tasks", pool.clone()),
            users: Collection::new("users", pool),
        }
    }

    /// Create a comment authored by the caller on an existing task.
    pub async fn create(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        content: String,
    ) -> Result<CommentView, ApiError> {
        if !self.tasks.exists_by_id(task_id).await? {
            return Err(ApiError::not_found("Task not found"));
        }

        let doc = Document::new()
            .set("id", Uuid::new_v4())
            .set("content", content)
            .set("task_id", task_id)
            .set("user_id", user_id)
            .set("created_at", Utc::now());
        let comment = self.comments.insert(doc).await?;
        self.populate_one(comment).await
    }

    pub async fn list(&self, params: &CommentListParams) -> Result<Page<CommentView>, ApiError> {
        let predicate = build_predicate(params)?;
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
        let data = self.comments.find(&spec).await?;
        let total = self.comments.count(&predicate).await?;
        let views = self.populate(data).await?;
        Ok(Page::new(views, total, &window))
    }

    pub async fn get(&self, id: Uuid) -> Result<CommentView, ApiError> {
        let comment = self
            .comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Comment not found"))?;
        self.populate_one(comment).await
    }

    pub async fn update(&self, id: Uuid, update: CommentUpdate) -> Result<CommentView, ApiError> {
        if let Some(task_id) = update.task_id {
            if !self.tasks.exists_by_id(task_id).await? {
                return Err(ApiError::not_found("Task not found"));
            }
        }
        if let Some(user_id) = update.user_id {
            if !self.users.exists_by_id(user_id).await? {
                return Err(ApiError::not_found("User not found"));
            }
        }

        let doc = Document::new()
            .maybe("content", update.content)
            .maybe("task_id", update.task_id)
            .maybe("user_id", update.user_id);
        let comment = self
            .comments
            .update_by_id(id, doc)
            .await?
            .ok_or_else(|| ApiError::not_found("Comment not found"))?;
        self.populate_one(comment).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<Comment, ApiError> {
        self.comments
            .delete_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Comment not found"))
    }

    async fn populate_one(&self, comment: Comment) -> Result<CommentView, ApiError> {
        Ok(self.populate(vec![comment]).await?.remove(0))
    }

    /// Expand task and author references with two batched lookups.
    async fn populate(&self, comments: Vec<Comment>) -> Result<Vec<CommentView>, ApiError> {
        let mut task_ids: Vec<Uuid> = comments.iter().map(|c| c.task_id).collect();
        task_ids.sort_unstable();
        task_ids.dedup();

        let mut user_ids: Vec<Uuid> = comments.iter().map(|c| c.user_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let tasks = self.tasks.find_ids(&task_ids).await?;
        let task_refs: HashMap<Uuid, TaskRef> =
            tasks.iter().map(|t| (t.id, TaskRef::from(t))).collect();

        let users = self.users.find_ids(&user_ids).await?;
        let user_refs: HashMap<Uuid, UserRef> =
            users.iter().map(|u| (u.id, UserRef::from(u))).collect();

        Ok(comments
            .into_iter()
            .map(|c| CommentView {
                id: c.id,
                content: c.content,
                task_id: task_refs.get(&c.task_id).cloned(),
                user_id: user_refs.get(&c.user_id).cloned(),
                created_at: c.created_at,
            })
            .collect())
    }
}

fn build_predicate(params: &CommentListParams) -> Result<Predicate, ApiError> {
    let mut predicate = Predicate::new();
    if let Some(raw) = &params.task_id {
        predicate.and(Condition::Eq("task_id", parse_uuid(raw, "taskId")?.into()));
    }
    if let Some(raw) = &params.user_id {
        predicate.and(Condition::Eq("user_id", parse_uuid(raw, "userId")?.into()));
    }
    // Inclusive creation-time window; either bound may appear alone.
    if let Some(raw) = &params.start_date {
        let ts = parse_timestamp(raw)
            .ok_or_else(|| ApiError::bad_request("Invalid startDate value"))?;
        predicate.and(Condition::Gte("created_at", ts.into()));
    }
    if let Some(raw) = &params.end_date {
        let ts =
            parse_timestamp(raw).ok_or_else(|| ApiError::bad_request("Invalid endDate value"))?;
        predicate.and(Condition::Lte("created_at", ts.into()));
    }
    if let Some(s) = &params.search {
        predicate.search(&["content"], s);
    }
    Ok(predicate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_window_bounds_are_inclusive_and_independent() {
        let params = CommentListParams {
            start_date: Some("2024-01-01".into()),
            ..Default::default()
        };
        let predicate = build_predicate(&params).unwrap();
        let (sql, _) = predicate.to_sql(0);
        assert_eq!(sql, "\"created_at\" >= $1");

        let params = CommentListParams {
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-02-01".into()),
            ..Default::default()
        };
        let predicate = build_predicate(&params).unwrap();
        let (sql, _) = predicate.to_sql(0);
        assert_eq!(sql, "\"created_at\" >= $1 AND \"created_at\" <= $2");
    }

    #[test]
    fn malformed_dates_are_validation_failures() {
        let params = CommentListParams {
            end_date: Some("next tuesday".into()),
            ..Default::default()
        };
        let err = build_predicate(&params).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Invalid endDate value");
    }

    #[test]
    fn only_created_at_is_sortable() {
        let key = SortKey::from_raw(Some("content"), Some("asc"), SORTABLE, DEFAULT_SORT);
        assert_eq!(key.column, "created_at");
        assert_eq!(key.direction, SortDirection::Desc);

        let key = SortKey::from_raw(Some("createdAt"), Some("asc"), SORTABLE, DEFAULT_SORT);
        assert_eq!(key.direction, SortDirection::Asc);
    }
}
