use super::types::SortDirection;

/// Single-key sort specification. The column is always one of the endpoint's
/// whitelisted sortable columns, so it is safe to interpolate quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: &'static str,
    pub direction: SortDirection,
}

impl SortKey {
    pub const fn new(column: &'static str, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Build a sort key from raw `sortBy` / `sortOrder` request parameters.
    ///
    /// `allowed` maps API parameter names to store columns (e.g. `"createdAt"`
    /// -> `"created_at"`). An unknown or missing `sortBy` falls back to the
    /// endpoint default key; a `sortOrder` other than exactly `asc` or `desc`
    /// falls back to the default direction. Nothing here errors.
    pub fn from_raw(
        sort_by: Option<&str>,
        sort_order: Option<&str>,
        allowed: &[(&'static str, &'static str)],
        default: SortKey,
    ) -> SortKey {
        let column = sort_by
            .and_then(|raw| allowed.iter().find(|(api, _)| *api == raw))
            .map(|(_, col)| *col)
            .unwrap_or(default.column);

        let direction = match sort_order {
            Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            _ => default.direction,
        };

        SortKey { column, direction }
    }

    pub fn to_sql(&self) -> String {
        format!("ORDER BY \"{}\" {}", self.column, self.direction.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWED: &[(&str, &str)] = &[("createdAt", "created_at"), ("name", "name")];
    const DEFAULT: SortKey = SortKey::new("created_at", SortDirection::Desc);

    #[test]
    fn missing_params_use_endpoint_default() {
        let key = SortKey::from_raw(None, None, ALLOWED, DEFAULT);
        assert_eq!(key, DEFAULT);
    }

    #[test]
    fn api_name_maps_to_store_column() {
        let key = SortKey::from_raw(Some("createdAt"), Some("asc"), ALLOWED, DEFAULT);
        assert_eq!(key.column, "created_at");
        assert_eq!(key.direction, SortDirection::Asc);
    }

    #[test]
    fn unknown_sort_column_falls_back_to_default() {
        let key = SortKey::from_raw(Some("password; DROP TABLE users"), None, ALLOWED, DEFAULT);
        assert_eq!(key.column, "created_at");
    }

    #[test]
    fn unknown_direction_falls_back_to_default_direction() {
        let key = SortKey::from_raw(Some("name"), Some("sideways"), ALLOWED, DEFAULT);
        assert_eq!(key.direction, SortDirection::Desc);

        let asc_default = SortKey::new("order_no", SortDirection::Asc);
        let key = SortKey::from_raw(None, Some("DESCENDING"), &[], asc_default);
        assert_eq!(key.direction, SortDirection::Asc);
    }

    #[test]
    fn renders_order_by_clause() {
        let key = SortKey::new("order_no", SortDirection::Asc);
        assert_eq!(key.to_sql(), "ORDER BY \"order_no\" ASC");
    }
}
