use crate::query::Scalar;

/// Ordered column/value set used for inserts and partial updates. Columns
/// are internal constants; absent fields simply never enter the document,
/// which is what makes `update_by_id` a partial update.
#[derive(Debug, Clone, Default)]
pub struct Document {
    fields: Vec<(&'static str, Scalar)>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column: &'static str, value: impl Into<Scalar>) -> Self {
        self.fields.push((column, value.into()));
        self
    }

    /// Set the column only when the value is present.
    pub fn maybe(self, column: &'static str, value: Option<impl Into<Scalar>>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[(&'static str, Scalar)] {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maybe_skips_absent_values() {
        let doc = Document::new()
            .set("title", "fix login")
            .maybe("status", Some("done"))
            .maybe("priority", None::<&str>);
        let columns: Vec<_> = doc.fields().iter().map(|(c, _)| *c).collect();
        assert_eq!(columns, vec!["title", "status"]);
    }
}
