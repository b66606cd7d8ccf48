use std::collections::{HashMap, HashSet};

use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::query::{Condition, ListSpec, Page, PageWindow, Predicate, Scalar, SortDirection, SortKey};
use crate::store::models::{Project, ProjectView, User, UserRef};
use crate::store::{Collection, Document};

// Project listings are always newest-first; the endpoint takes no sort
// parameters.
const LIST_SORT: SortKey = SortKey::new("created_at", SortDirection::Desc);

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub is_deleted: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_deleted: Option<bool>,
}

pub struct ProjectService {
    projects: Collection<Project>,
    users: Collection<User>,
}

impl ProjectService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            projects: Collection::new("projects", pool.clone()),
            users: Collection::new("users", pool),
        }
    }

    /// Create a project owned by `created_by`. Every member id is validated
    /// individually; the failure names exactly the ids that do not exist.
    pub async fn create(
        &self,
        created_by: Uuid,
        name: String,
        description: String,
        members: Vec<Uuid>,
    ) -> Result<ProjectView, ApiError> {
        if !members.is_empty() {
            let existing = self.users.find_ids(&members).await?;
            let existing_ids: HashSet<Uuid> = existing.iter().map(|u| u.id).collect();
            let invalid = invalid_member_ids(&members, &existing_ids);
            if !invalid.is_empty() {
                return Err(ApiError::bad_request(format!(
                    "Invalid member IDs: {}",
                    invalid
                        .iter()
                        .map(|id| id.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )));
            }
        }

        let doc = Document::new()
            .set("id", Uuid::new_v4())
            .set("name", name)
            .set("description", description)
            .set("created_by", created_by)
            .set("members", Scalar::UuidArray(members))
            .set("is_deleted", false)
            .set("created_at", Utc::now());
        let project = self.projects.insert(doc).await?;
        self.populate_one(project).await
    }

    /// Projects the caller can read: owned or member of.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        params: &ProjectListParams,
    ) -> Result<Page<ProjectView>, ApiError> {
        let predicate = build_predicate(user_id, params);
        let window = PageWindow::from_raw(params.page.as_deref(), params.limit.as_deref());
        let spec = ListSpec {
            predicate: predicate.clone(),
            order: Some(LIST_SORT),
            page: Some(window),
        };
        let data = self.projects.find(&spec).await?;
        let total = self.projects.count(&predicate).await?;
        let views = self.populate(data).await?;
        Ok(Page::new(views, total, &window))
    }

    pub async fn get(&self, id: Uuid) -> Result<ProjectView, ApiError> {
        let project = self
            .projects
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Project not found"))?;
        self.populate_one(project).await
    }

    pub async fn update(&self, id: Uuid, update: ProjectUpdate) -> Result<ProjectView, ApiError> {
        let doc = Document::new()
            .maybe("name", update.name)
            .maybe("description", update.description)
            .maybe("is_deleted", update.is_deleted);
        let project = self
            .projects
            .update_by_id(id, doc)
            .await?
            .ok_or_else(|| ApiError::not_found("Project not found"))?;
        self.populate_one(project).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<Project, ApiError> {
        self.projects
            .delete_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Project not found"))
    }

    /// Idempotent: adding a user who is already a member is a no-op.
    pub async fn add_member(&self, project_id: Uuid, user_id: Uuid) -> Result<ProjectView, ApiError> {
        self.mutate_members(project_id, |members| with_member(members, user_id))
            .await
    }

    /// Idempotent: removing a non-member is a no-op.
    pub async fn remove_member(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<ProjectView, ApiError> {
        self.mutate_members(project_id, |members| without_member(members, user_id))
            .await
    }

    /// Read-modify-write on the member set. When the mutation is a no-op
    /// the project is returned as-is, without a second store call.
    async fn mutate_members(
        &self,
        project_id: Uuid,
        mutate: impl FnOnce(&[Uuid]) -> Option<Vec<Uuid>>,
    ) -> Result<ProjectView, ApiError> {
        let mut project = self
            .projects
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Project not found"))?;

        if let Some(members) = mutate(&project.members) {
            let doc = Document::new().set("members", Scalar::UuidArray(members));
            project = self
                .projects
                .update_by_id(project_id, doc)
                .await?
                .ok_or_else(|| ApiError::not_found("Project not found"))?;
        }
        self.populate_one(project).await
    }

    async fn populate_one(&self, project: Project) -> Result<ProjectView, ApiError> {
        Ok(self.populate(vec![project]).await?.remove(0))
    }

    /// Expand created_by and member references into user projections with
    /// one batched lookup.
    async fn populate(&self, projects: Vec<Project>) -> Result<Vec<ProjectView>, ApiError> {
        let mut ids: Vec<Uuid> = projects.iter().map(|p| p.created_by).collect();
        ids.extend(projects.iter().flat_map(|p| p.members.iter().copied()));
        ids.sort_unstable();
        ids.dedup();

        let users = self.users.find_ids(&ids).await?;
        let refs: HashMap<Uuid, UserRef> = users.iter().map(|u| (u.id, UserRef::from(u))).collect();

        Ok(projects
            .into_iter()
            .map(|p| ProjectView {
                id: p.id,
                name: p.name,
                description: p.description,
                created_by: refs.get(&p.created_by).cloned(),
                members: p.members.iter().filter_map(|m| refs.get(m).cloned()).collect(),
                is_deleted: p.is_deleted,
                created_at: p.created_at,
            })
            .collect())
    }
}

fn build_predicate(user_id: Uuid, params: &ProjectListParams) -> Predicate {
    let mut predicate = Predicate::new();
    predicate.and(Condition::AnyOf(vec![
        Condition::Eq("created_by", Scalar::Uuid(user_id)),
        Condition::Contains("members", user_id),
    ]));
    if let Some(v) = &params.is_deleted {
        predicate.and(Condition::Eq("is_deleted", Scalar::Bool(v == "true")));
    }
    if let Some(s) = &params.search {
        predicate.search(&["name", "description"], s);
    }
    predicate
}

/// The member set plus `user_id`, or None when already present.
fn with_member(members: &[Uuid], user_id: Uuid) -> Option<Vec<Uuid>> {
    if members.contains(&user_id) {
        return None;
    }
    let mut next = members.to_vec();
    next.push(user_id);
    Some(next)
}

/// The member set minus `user_id`, or None when not a member.
fn without_member(members: &[Uuid], user_id: Uuid) -> Option<Vec<Uuid>> {
    if !members.contains(&user_id) {
        return None;
    }
    Some(members.iter().copied().filter(|m| *m != user_id).collect())
}

fn invalid_member_ids(requested: &[Uuid], existing: &HashSet<Uuid>) -> Vec<Uuid> {
    requested
        .iter()
        .filter(|id| !existing.contains(id))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_is_always_scoped_to_owner_or_membership() {
        let user = Uuid::new_v4();
        let predicate = build_predicate(user, &ProjectListParams::default());
        let (sql, values) = predicate.to_sql(0);
        assert_eq!(sql, "(\"created_by\" = $1 OR $2 = ANY(\"members\"))");
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn filters_and_search_stack_onto_membership_constraint() {
        let params = ProjectListParams {
            is_deleted: Some("false".into()),
            search: Some("alpha".into()),
            ..Default::default()
        };
        let predicate = build_predicate(Uuid::new_v4(), &params);
        let (sql, _) = predicate.to_sql(0);
        assert_eq!(
            sql,
            "(\"created_by\" = $1 OR $2 = ANY(\"members\")) AND \"is_deleted\" = $3 \
             AND (\"name\" ILIKE $4 OR \"description\" ILIKE $5)"
        );
    }

    #[test]
    fn invalid_members_are_exactly_the_missing_ids() {
        let known = Uuid::new_v4();
        let bogus_a = Uuid::new_v4();
        let bogus_b = Uuid::new_v4();
        let existing: HashSet<Uuid> = [known].into_iter().collect();

        let invalid = invalid_member_ids(&[known, bogus_a, bogus_b], &existing);
        assert_eq!(invalid, vec![bogus_a, bogus_b]);

        assert!(invalid_member_ids(&[known], &existing).is_empty());
    }

    #[test]
    fn adding_an_existing_member_is_a_no_op() {
        let member = Uuid::new_v4();
        let newcomer = Uuid::new_v4();

        assert_eq!(with_member(&[member], member), None);
        assert_eq!(with_member(&[member], newcomer), Some(vec![member, newcomer]));
    }

    #[test]
    fn removing_a_non_member_is_a_no_op() {
        let member = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        assert_eq!(without_member(&[member], stranger), None);
        assert_eq!(without_member(&[member], member), Some(vec![]));
    }
}
