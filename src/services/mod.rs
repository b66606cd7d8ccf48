//! Entity services: enforce cross-entity existence invariants, translate
//! request parameters through the query layer, and perform the store
//! operation. One service per collection; all are stateless over a shared
//! pool.

pub mod comment;
pub mod project;
pub mod task;
pub mod user;

pub use comment::CommentService;
pub use project::ProjectService;
pub use task::TaskService;
pub use user::UserService;

use uuid::Uuid;

use crate::error::ApiError;

/// Parse an id arriving as a query-string parameter.
pub(crate) fn parse_uuid(raw: &str, field: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid {} id", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_ids_with_field_name() {
        let err = parse_uuid("not-a-uuid", "taskId").unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.message().contains("taskId"));
    }
}
