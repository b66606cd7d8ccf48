use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::query::{Condition, ListSpec, Page, PageWindow, Predicate, Scalar, SortDirection, SortKey};
use crate::store::models::User;
use crate::store::{Collection, Document};

const SORTABLE: &[(&str, &str)] = &[
    ("createdAt", "created_at"),
    ("updatedAt", "updated_at"),
    ("name", "name"),
    ("email", "email"),
];
const DEFAULT_SORT: SortKey = SortKey::new("created_at", SortDirection::Desc);

/// Raw listing parameters as they arrive on the query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub is_admin: Option<String>,
    pub is_deleted: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_admin: Option<bool>,
    pub is_deleted: Option<bool>,
}

pub struct UserService {
    users: Collection<User>,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: Collection::new("users", pool),
        }
    }

    pub async fn list(&self, params: &UserListParams) -> Result<Page<User>, ApiError> {
        let (predicate, order, window) = build_query(params);
        let spec = ListSpec {
            predicate: predicate.clone(),
            order: Some(order),
            page: Some(window),
        };
        let data = self.users.find(&spec).await?;
        let total = self.users.count(&predicate).await?;
        Ok(Page::new(data, total, &window))
    }

    pub async fn get(&self, id: Uuid) -> Result<User, ApiError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub async fn update(&self, id: Uuid, update: UserUpdate) -> Result<User, ApiError> {
        let doc = Document::new()
            .maybe("name", update.name)
            .maybe("email", update.email)
            .maybe("is_admin", update.is_admin)
            .maybe("is_deleted", update.is_deleted)
            .set("updated_at", Utc::now());
        self.users
            .update_by_id(id, doc)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<User, ApiError> {
        self.users
            .delete_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    /// Credential-flow lookup; email is unique.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let mut predicate = Predicate::new();
        predicate.and(Condition::Eq("email", Scalar::from(email)));
        Ok(self.users.find_one(&predicate).await?)
    }

    /// Insert a new user with a pre-hashed password. Duplicate emails are
    /// also caught by the unique index and surface as Conflict.
    pub async fn create(
        &self,
        name: String,
        email: String,
        password_hash: String,
    ) -> Result<User, ApiError> {
        let now = Utc::now();
        let doc = Document::new()
            .set("id", Uuid::new_v4())
            .set("name", name)
            .set("email", email)
            .set("password", password_hash)
            .set("is_admin", false)
            .set("is_deleted", false)
            .set("created_at", now)
            .set("updated_at", now);
        Ok(self.users.insert(doc).await?)
    }
}

fn build_query(params: &UserListParams) -> (Predicate, SortKey, PageWindow) {
    let mut predicate = Predicate::new();
    if let Some(v) = &params.is_admin {
        predicate.and(Condition::Eq("is_admin", Scalar::Bool(v == "true")));
    }
    if let Some(v) = &params.is_deleted {
        predicate.and(Condition::Eq("is_deleted", Scalar::Bool(v == "true")));
    }
    if let Some(s) = &params.search {
        predicate.search(&["name", "email"], s);
    }

    let order = SortKey::from_raw(
        params.sort_by.as_deref(),
        params.sort_order.as_deref(),
        SORTABLE,
        DEFAULT_SORT,
    );
    let window = PageWindow::from_raw(params.page.as_deref(), params.limit.as_deref());
    (predicate, order, window)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_filters_means_unconstrained_default_sorted_listing() {
        let (predicate, order, window) = build_query(&UserListParams::default());
        assert!(predicate.is_empty());
        assert_eq!(order, DEFAULT_SORT);
        assert_eq!(window, PageWindow { page: 1, limit: 10 });
    }

    #[test]
    fn flag_filters_treat_only_true_as_true() {
        let params = UserListParams {
            is_admin: Some("true".into()),
            is_deleted: Some("yes".into()),
            ..Default::default()
        };
        let (predicate, _, _) = build_query(&params);
        let (sql, values) = predicate.to_sql(0);
        assert_eq!(sql, "\"is_admin\" = $1 AND \"is_deleted\" = $2");
        assert_eq!(values[0], Scalar::Bool(true));
        assert_eq!(values[1], Scalar::Bool(false));
    }

    #[test]
    fn search_spans_name_and_email() {
        let params = UserListParams {
            search: Some("engine".into()),
            ..Default::default()
        };
        let (predicate, _, _) = build_query(&params);
        let (sql, _) = predicate.to_sql(0);
        assert_eq!(sql, "(\"name\" ILIKE $1 OR \"email\" ILIKE $2)");
    }
}
