//! Table creation for records.
//!
//! Auditable tables get the seven audit columns appended and an index on
//! `deleted_at`. All statements use `IF NOT EXISTS` for idempotent re-running.

use crate::AuditDb;
use crate::error::DatabaseError;
use crate::helpers::is_identifier;

/// Column definitions of the persisted audit field set.
///
/// `created_by_name` / `updated_by_name` have no column.
#[must_use]
pub const fn audit_columns_ddl() -> &'static str {
    "created_at TEXT NOT NULL DEFAULT (datetime('now')),
    created_by_id TEXT,
    created_by_role INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_by_id TEXT,
    updated_by_role INTEGER NOT NULL DEFAULT 0,
    deleted_at TEXT"
}

fn create_table_sql(table: &str, columns: &[&str], auditable: bool) -> String {
    let mut defs = vec!["id TEXT PRIMARY KEY".to_string()];
    defs.extend(columns.iter().map(|c| (*c).to_string()));
    if auditable {
        defs.push(audit_columns_ddl().to_string());
    }

    let mut sql = format!(
        "CREATE TABLE IF NOT EXISTS {table} (\n    {}\n);",
        defs.join(",\n    ")
    );
    if auditable {
        sql.push_str(&format!(
            "\nCREATE INDEX IF NOT EXISTS idx_{table}_deleted_at ON {table}(deleted_at);"
        ));
    }
    sql
}

impl AuditDb {
    /// Create `table` if it does not exist.
    ///
    /// `columns` are full column definitions (e.g. `"title TEXT NOT NULL"`)
    /// excluding `id`, which is always `TEXT PRIMARY KEY`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Migration` if the table name is not a plain
    /// identifier or the DDL fails.
    pub async fn ensure_table(
        &self,
        table: &str,
        columns: &[&str],
        auditable: bool,
    ) -> Result<(), DatabaseError> {
        if !is_identifier(table) {
            return Err(DatabaseError::Migration(format!(
                "invalid table name '{table}'"
            )));
        }
        let sql = create_table_sql(table, columns, auditable);
        self.conn
            .execute_batch(&sql)
            .await
            .map_err(|e| DatabaseError::Migration(format!("{table}: {e}")))?;
        tracing::debug!(table, auditable, "ensured table");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use audited_core::columns::PERSISTED;

    use super::*;

    async fn table_columns(db: &AuditDb, table: &str) -> Vec<String> {
        let mut rows = db
            .conn()
            .query(&format!("SELECT name FROM pragma_table_info('{table}')"), ())
            .await
            .unwrap();
        let mut names = Vec::new();
        while let Some(row) = rows.next().await.unwrap() {
            names.push(row.get::<String>(0).unwrap());
        }
        names
    }

    #[tokio::test]
    async fn auditable_table_has_audit_columns_and_index() {
        let db = AuditDb::open_local(":memory:").await.unwrap();
        db.ensure_table("notes", &["title TEXT NOT NULL"], true)
            .await
            .unwrap();

        let columns = table_columns(&db, "notes").await;
        for column in PERSISTED {
            assert!(columns.iter().any(|c| c == column), "missing {column}");
        }
        assert!(!columns.iter().any(|c| c.ends_with("_by_name")));

        let mut rows = db
            .conn()
            .query(
                "SELECT name FROM sqlite_master WHERE type='index' AND name=?1",
                ["idx_notes_deleted_at"],
            )
            .await
            .unwrap();
        assert!(rows.next().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn plain_table_has_no_audit_columns() {
        let db = AuditDb::open_local(":memory:").await.unwrap();
        db.ensure_table("tags", &["name TEXT NOT NULL"], false)
            .await
            .unwrap();
        assert_eq!(table_columns(&db, "tags").await, ["id", "name"]);
    }

    #[tokio::test]
    async fn ensure_table_is_idempotent() {
        let db = AuditDb::open_local(":memory:").await.unwrap();
        db.ensure_table("notes", &["title TEXT"], true).await.unwrap();
        db.ensure_table("notes", &["title TEXT"], true).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_non_identifier_table() {
        let db = AuditDb::open_local(":memory:").await.unwrap();
        let err = db
            .ensure_table("notes; DROP TABLE x", &[], true)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Migration(_)));
    }
}
