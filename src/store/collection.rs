use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::query::{ListSpec, Predicate, Scalar};
use crate::store::document::Document;
use crate::store::error::StoreError;

/// Typed handle on one store collection (table). All entity services reach
/// the store through this interface; no SQL lives outside this module.
pub struct Collection<T> {
    table: &'static str,
    pool: PgPool,
    _marker: std::marker::PhantomData<T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            table: self.table,
            pool: self.pool.clone(),
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table: &'static str, pool: PgPool) -> Self {
        Self {
            table,
            pool,
            _marker: std::marker::PhantomData,
        }
    }

    /// Filtered find with optional sort and pagination window.
    pub async fn find(&self, spec: &ListSpec) -> Result<Vec<T>, StoreError> {
        let (sql, params) = select_sql(self.table, spec);
        let mut q = sqlx::query_as::<_, T>(&sql);
        for p in &params {
            q = bind_scalar(q, p);
        }
        Ok(q.fetch_all(&self.pool).await?)
    }

    /// First row matching the predicate, if any.
    pub async fn find_one(&self, predicate: &Predicate) -> Result<Option<T>, StoreError> {
        let (where_sql, params) = predicate.to_sql(0);
        let mut sql = format!("SELECT * FROM \"{}\"", self.table);
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }
        sql.push_str(" LIMIT 1");
        let mut q = sqlx::query_as::<_, T>(&sql);
        for p in &params {
            q = bind_scalar(q, p);
        }
        Ok(q.fetch_optional(&self.pool).await?)
    }

    pub async fn count(&self, predicate: &Predicate) -> Result<i64, StoreError> {
        let (where_sql, params) = predicate.to_sql(0);
        let mut sql = format!("SELECT COUNT(*) FROM \"{}\"", self.table);
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }
        let mut q = sqlx::query_scalar::<_, i64>(&sql);
        for p in &params {
            q = bind_scalar_value(q, p);
        }
        Ok(q.fetch_one(&self.pool).await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        let sql = format!("SELECT * FROM \"{}\" WHERE \"id\" = $1", self.table);
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Batch fetch by id; used by the reference-expansion (populate) step.
    pub async fn find_ids(&self, ids: &[Uuid]) -> Result<Vec<T>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!("SELECT * FROM \"{}\" WHERE \"id\" = ANY($1)", self.table);
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn exists_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM \"{}\" WHERE \"id\" = $1)",
            self.table
        );
        Ok(sqlx::query_scalar::<_, bool>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn insert(&self, doc: Document) -> Result<T, StoreError> {
        let sql = insert_sql(self.table, &doc);
        let mut q = sqlx::query_as::<_, T>(&sql);
        for (_, value) in doc.fields() {
            q = bind_scalar(q, value);
        }
        Ok(q.fetch_one(&self.pool).await?)
    }

    /// Partial update; returns the updated row or None when the id is absent.
    /// An empty document degrades to a plain read, mirroring a no-op update.
    pub async fn update_by_id(&self, id: Uuid, doc: Document) -> Result<Option<T>, StoreError> {
        if doc.is_empty() {
            return self.find_by_id(id).await;
        }
        let sql = update_sql(self.table, &doc);
        let mut q = sqlx::query_as::<_, T>(&sql);
        for (_, value) in doc.fields() {
            q = bind_scalar(q, value);
        }
        q = q.bind(id);
        Ok(q.fetch_optional(&self.pool).await?)
    }

    /// Delete by id; returns the deleted row or None when nothing matched.
    pub async fn delete_by_id(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        let sql = format!("DELETE FROM \"{}\" WHERE \"id\" = $1 RETURNING *", self.table);
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }
}

fn select_sql(table: &str, spec: &ListSpec) -> (String, Vec<Scalar>) {
    let (where_sql, params) = spec.predicate.to_sql(0);
    let mut sql = format!("SELECT * FROM \"{}\"", table);
    if !where_sql.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&where_sql);
    }
    if let Some(order) = &spec.order {
        sql.push(' ');
        sql.push_str(&order.to_sql());
    }
    if let Some(page) = &spec.page {
        sql.push_str(&format!(" LIMIT {} OFFSET {}", page.limit, page.offset()));
    }
    (sql, params)
}

fn insert_sql(table: &str, doc: &Document) -> String {
    let columns: Vec<String> = doc.fields().iter().map(|(c, _)| format!("\"{}\"", c)).collect();
    let placeholders: Vec<String> = (1..=doc.fields().len()).map(|i| format!("${}", i)).collect();
    format!(
        "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING *",
        table,
        columns.join(", "),
        placeholders.join(", ")
    )
}

fn update_sql(table: &str, doc: &Document) -> String {
    let assignments: Vec<String> = doc
        .fields()
        .iter()
        .enumerate()
        .map(|(i, (c, _))| format!("\"{}\" = ${}", c, i + 1))
        .collect();
    format!(
        "UPDATE \"{}\" SET {} WHERE \"id\" = ${} RETURNING *",
        table,
        assignments.join(", "),
        doc.fields().len() + 1
    )
}

fn bind_scalar<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    v: &Scalar,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        Scalar::Null => q.bind(None::<String>),
        Scalar::Bool(b) => q.bind(*b),
        Scalar::Int(i) => q.bind(*i),
        Scalar::Text(s) => q.bind(s.clone()),
        Scalar::Uuid(u) => q.bind(*u),
        Scalar::Timestamp(t) => q.bind(*t),
        Scalar::UuidArray(ids) => q.bind(ids.clone()),
    }
}

fn bind_scalar_value<'q, O>(
    q: sqlx::query::QueryScalar<'q, Postgres, O, PgArguments>,
    v: &Scalar,
) -> sqlx::query::QueryScalar<'q, Postgres, O, PgArguments> {
    match v {
        Scalar::Null => q.bind(None::<String>),
        Scalar::Bool(b) => q.bind(*b),
        Scalar::Int(i) => q.bind(*i),
        Scalar::Text(s) => q.bind(s.clone()),
        Scalar::Uuid(u) => q.bind(*u),
        Scalar::Timestamp(t) => q.bind(*t),
        Scalar::UuidArray(ids) => q.bind(ids.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Condition, PageWindow, Scalar, SortDirection, SortKey};

    #[test]
    fn select_sql_without_filters_is_bare() {
        let (sql, params) = select_sql("users", &ListSpec::default());
        assert_eq!(sql, "SELECT * FROM \"users\"");
        assert!(params.is_empty());
    }

    #[test]
    fn select_sql_combines_where_order_and_window() {
        let mut predicate = Predicate::new();
        predicate.and(Condition::Eq("status", Scalar::from("pending")));
        let spec = ListSpec {
            predicate,
            order: Some(SortKey::new("order_no", SortDirection::Asc)),
            page: Some(PageWindow { page: 2, limit: 10 }),
        };
        let (sql, params) = select_sql("tasks", &spec);
        assert_eq!(
            sql,
            "SELECT * FROM \"tasks\" WHERE \"status\" = $1 ORDER BY \"order_no\" ASC LIMIT 10 OFFSET 10"
        );
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn insert_sql_numbers_placeholders_in_field_order() {
        let doc = Document::new().set("content", "hi").set("task_id", Uuid::nil());
        assert_eq!(
            insert_sql("comments", &doc),
            "INSERT INTO \"comments\" (\"content\", \"task_id\") VALUES ($1, $2) RETURNING *"
        );
    }

    #[test]
    fn update_sql_binds_id_after_assignments() {
        let doc = Document::new().set("status", "done").set("priority", "high");
        assert_eq!(
            update_sql("tasks", &doc),
            "UPDATE \"tasks\" SET \"status\" = $1, \"priority\" = $2 WHERE \"id\" = $3 RETURNING *"
        );
    }
}
