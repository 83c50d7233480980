//! Column names of the persisted audit field set.
//!
//! `created_by_name` and `updated_by_name` have no column: they are filled by
//! join queries and never written.

pub const CREATED_AT: &str = "created_at";
pub const CREATED_BY_ID: &str = "created_by_id";
pub const CREATED_BY_ROLE: &str = "created_by_role";
pub const UPDATED_AT: &str = "updated_at";
pub const UPDATED_BY_ID: &str = "updated_by_id";
pub const UPDATED_BY_ROLE: &str = "updated_by_role";
pub const DELETED_AT: &str = "deleted_at";

/// Every audit column, in schema order.
pub const PERSISTED: [&str; 7] = [
    CREATED_AT,
    CREATED_BY_ID,
    CREATED_BY_ROLE,
    UPDATED_AT,
    UPDATED_BY_ID,
    UPDATED_BY_ROLE,
    DELETED_AT,
];

/// Whether `column` belongs to the persisted audit field set.
#[must_use]
pub fn is_audit_column(column: &str) -> bool {
    PERSISTED.contains(&column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_fields_are_not_persisted() {
        assert!(!is_audit_column("created_by_name"));
        assert!(!is_audit_column("updated_by_name"));
    }

    #[test]
    fn persisted_columns_are_recognised() {
        for column in PERSISTED {
            assert!(is_audit_column(column), "{column} should be an audit column");
        }
        assert!(!is_audit_column("title"));
    }
}
