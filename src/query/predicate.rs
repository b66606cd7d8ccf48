use uuid::Uuid;

use super::types::Scalar;

/// One boolean constraint against a stored column. Column names are internal
/// constants, never user input, so they can be quoted verbatim.
#[derive(Debug, Clone)]
pub enum Condition {
    /// `"col" = $n`, or `"col" IS NULL` when the value is null.
    Eq(&'static str, Scalar),
    /// `"col" >= $n` (inclusive lower bound).
    Gte(&'static str, Scalar),
    /// `"col" <= $n` (inclusive upper bound).
    Lte(&'static str, Scalar),
    /// `$n = ANY("col")` - membership in a uuid[] column.
    Contains(&'static str, Uuid),
    /// `"col" ILIKE '%needle%'` - case-insensitive substring match.
    /// `%`, `_` and `\` in the needle are escaped.
    ILike(&'static str, String),
    /// OR-group: `(c1 OR c2 OR ...)`.
    AnyOf(Vec<Condition>),
}

/// AND-combined set of conditions, rendered to a parameterized WHERE
/// fragment with `$1..$n` placeholders. Pure: no side effects, no store
/// access.
#[derive(Debug, Clone, Default)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(&mut self, condition: Condition) -> &mut Self {
        self.conditions.push(condition);
        self
    }

    /// Free-text search: case-insensitive substring OR-ed across the given
    /// columns. An empty needle imposes no constraint.
    pub fn search(&mut self, columns: &[&'static str], needle: &str) -> &mut Self {
        if needle.is_empty() {
            return self;
        }
        let group = columns
            .iter()
            .map(|col| Condition::ILike(col, needle.to_string()))
            .collect();
        self.and(Condition::AnyOf(group))
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Render to `(where_fragment, bind_values)`. An empty predicate renders
    /// to an empty fragment; callers omit the WHERE keyword in that case.
    /// `starting_param_index` is the number of placeholders already consumed
    /// by the enclosing statement.
    pub fn to_sql(&self, starting_param_index: usize) -> (String, Vec<Scalar>) {
        let mut sink = ParamSink::new(starting_param_index);
        let parts: Vec<String> = self.conditions.iter().map(|c| render(c, &mut sink)).collect();
        (parts.join(" AND "), sink.values)
    }
}

struct ParamSink {
    values: Vec<Scalar>,
    index: usize,
}

impl ParamSink {
    fn new(starting_index: usize) -> Self {
        Self { values: vec![], index: starting_index }
    }

    fn push(&mut self, value: Scalar) -> String {
        self.values.push(value);
        self.index += 1;
        format!("${}", self.index)
    }
}

fn render(condition: &Condition, sink: &mut ParamSink) -> String {
    match condition {
        Condition::Eq(col, Scalar::Null) => format!("\"{}\" IS NULL", col),
        Condition::Eq(col, value) => format!("\"{}\" = {}", col, sink.push(value.clone())),
        Condition::Gte(col, value) => format!("\"{}\" >= {}", col, sink.push(value.clone())),
        Condition::Lte(col, value) => format!("\"{}\" <= {}", col, sink.push(value.clone())),
        Condition::Contains(col, id) => {
            format!("{} = ANY(\"{}\")", sink.push(Scalar::Uuid(*id)), col)
        }
        Condition::ILike(col, needle) => {
            let pattern = format!("%{}%", escape_like(needle));
            format!("\"{}\" ILIKE {}", col, sink.push(Scalar::Text(pattern)))
        }
        Condition::AnyOf(group) => {
            if group.is_empty() {
                return "1=1".to_string();
            }
            let parts: Vec<String> = group.iter().map(|c| render(c, sink)).collect();
            format!("({})", parts.join(" OR "))
        }
    }
}

/// Escape LIKE metacharacters so the needle matches literally.
fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_predicate_renders_empty_fragment() {
        let p = Predicate::new();
        let (sql, params) = p.to_sql(0);
        assert!(sql.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn equality_conditions_are_anded_with_numbered_params() {
        let mut p = Predicate::new();
        p.and(Condition::Eq("status", Scalar::from("pending")));
        p.and(Condition::Eq("is_deleted", Scalar::Bool(false)));
        let (sql, params) = p.to_sql(0);
        assert_eq!(sql, "\"status\" = $1 AND \"is_deleted\" = $2");
        assert_eq!(params.len(), 2);
        assert_eq!(params[0], Scalar::Text("pending".to_string()));
        assert_eq!(params[1], Scalar::Bool(false));
    }

    #[test]
    fn null_equality_renders_is_null_without_param() {
        let mut p = Predicate::new();
        p.and(Condition::Eq("assign_to", Scalar::Null));
        let (sql, params) = p.to_sql(0);
        assert_eq!(sql, "\"assign_to\" IS NULL");
        assert!(params.is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring_or_group() {
        let mut p = Predicate::new();
        p.search(&["name", "email"], "enginE");
        let (sql, params) = p.to_sql(0);
        assert_eq!(sql, "(\"name\" ILIKE $1 OR \"email\" ILIKE $2)");
        assert_eq!(params[0], Scalar::Text("%enginE%".to_string()));
        assert_eq!(params[1], Scalar::Text("%enginE%".to_string()));
    }

    #[test]
    fn empty_search_needle_imposes_no_constraint() {
        let mut p = Predicate::new();
        p.search(&["content"], "");
        assert!(p.is_empty());
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        let mut p = Predicate::new();
        p.search(&["content"], "100%_done");
        let (_, params) = p.to_sql(0);
        assert_eq!(params[0], Scalar::Text("%100\\%\\_done%".to_string()));
    }

    #[test]
    fn membership_or_group_renders_any() {
        let user = Uuid::new_v4();
        let mut p = Predicate::new();
        p.and(Condition::AnyOf(vec![
            Condition::Eq("created_by", Scalar::Uuid(user)),
            Condition::Contains("members", user),
        ]));
        let (sql, params) = p.to_sql(0);
        assert_eq!(sql, "(\"created_by\" = $1 OR $2 = ANY(\"members\"))");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn date_bounds_render_inclusive_comparisons() {
        use chrono::{TimeZone, Utc};
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let mut p = Predicate::new();
        p.and(Condition::Gte("created_at", Scalar::Timestamp(start)));
        p.and(Condition::Lte("created_at", Scalar::Timestamp(end)));
        let (sql, _) = p.to_sql(0);
        assert_eq!(sql, "\"created_at\" >= $1 AND \"created_at\" <= $2");
    }

    #[test]
    fn starting_param_index_offsets_placeholders() {
        let mut p = Predicate::new();
        p.and(Condition::Eq("status", Scalar::from("done")));
        let (sql, _) = p.to_sql(3);
        assert_eq!(sql, "\"status\" = $4");
    }
}
