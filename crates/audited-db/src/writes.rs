//! Record writes and lookups.
//!
//! Every write follows the same protocol:
//! 1. Build a `Scope` over the record and the caller's `WriteContext`
//! 2. Run the create or update chain (callbacks may rewrite columns)
//! 3. Execute the SQL with the resulting column set or attribute map
//!
//! Soft-deletable records (those with a `deleted_at` column) are invisible
//! to updates and scoped lookups once deleted.

use audited_core::WriteContext;
use audited_core::columns::DELETED_AT;
use chrono::Utc;
use libsql::Value;

use crate::AuditDb;
use crate::error::DatabaseError;
use crate::helpers::datetime_value;
use crate::model::{Columns, Model, Table};
use crate::scope::{Scope, WriteKind};

impl AuditDb {
    /// Insert `record`, generating an id if it has none.
    ///
    /// # Errors
    ///
    /// Returns the first callback error (nothing is written), or
    /// `DatabaseError` if the INSERT fails.
    pub async fn create<M: Model>(
        &self,
        ctx: &WriteContext,
        record: &mut M,
    ) -> Result<(), DatabaseError> {
        let columns = {
            let mut scope = Scope::new(WriteKind::Create, record, ctx);
            self.callbacks.create().run(&mut scope)?;
            scope.into_parts().0
        };

        if record.id().is_empty() {
            let id = self.generate_id(record.id_prefix()).await?;
            record.set_id(id);
        }

        let mut names = vec!["id".to_string()];
        let mut params = vec![Value::Text(record.id().to_string())];
        for (column, value) in columns {
            names.push(column);
            params.push(value);
        }
        let placeholders: Vec<String> = (1..=params.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            record.table_name(),
            names.join(", "),
            placeholders.join(", ")
        );
        self.conn
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        tracing::debug!(table = record.table_name(), id = record.id(), "record created");
        Ok(())
    }

    /// Write every column of `record` (a full-row update).
    ///
    /// `deleted_at` is never written here; use [`AuditDb::delete`].
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the record has no id,
    /// `DatabaseError::NoResult` if no live row matches, or the first
    /// callback error.
    pub async fn save<M: Model>(
        &self,
        ctx: &WriteContext,
        record: &mut M,
    ) -> Result<(), DatabaseError> {
        require_id(record)?;
        let columns = {
            let mut scope = Scope::new(WriteKind::Update, record, ctx);
            self.callbacks.update().run(&mut scope)?;
            scope.into_parts().0
        };

        let soft_delete = columns.contains_key(DELETED_AT);
        self.execute_update(record.table_name(), record.id(), &columns, soft_delete)
            .await?;
        tracing::debug!(table = record.table_name(), id = record.id(), "record saved");
        Ok(())
    }

    /// Sparse update: write only the columns in `attrs`.
    ///
    /// `attrs` is checked against the record's columns and assigned onto
    /// `record` before any callback runs, so `orm:before_update` sees the new
    /// values. The update chain then sees `attrs` as the scope's
    /// partial-attribute map and may extend it; whatever it adds is assigned
    /// back onto `record` after the write. An empty `attrs` is a no-op and
    /// runs no callbacks.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::UnknownColumn` if an attribute is not a column
    /// of the record (nothing is assigned or run), `DatabaseError::NoResult`
    /// if no live row matches, `DatabaseError::InvalidState` if the record
    /// has no id, or the first callback error.
    pub async fn update_columns<M: Model>(
        &self,
        ctx: &WriteContext,
        record: &mut M,
        attrs: Columns,
    ) -> Result<(), DatabaseError> {
        require_id(record)?;
        if attrs.is_empty() {
            return Ok(());
        }

        let known = record.columns();
        if let Some(column) = attrs.keys().find(|c| !known.contains_key(c.as_str())) {
            return Err(DatabaseError::UnknownColumn {
                table: record.table_name().to_string(),
                column: column.clone(),
            });
        }
        for (column, value) in &attrs {
            record.assign_column(column, value)?;
        }

        let (columns, attrs) = {
            let mut scope = Scope::new(WriteKind::Update, record, ctx).with_update_attrs(attrs);
            self.callbacks.update().run(&mut scope)?;
            let (columns, attrs) = scope.into_parts();
            (columns, attrs.unwrap_or_default())
        };

        // Callbacks may have added keys of their own.
        if let Some(column) = attrs.keys().find(|c| !columns.contains_key(c.as_str())) {
            return Err(DatabaseError::UnknownColumn {
                table: record.table_name().to_string(),
                column: column.clone(),
            });
        }

        let soft_delete = columns.contains_key(DELETED_AT);
        self.execute_update(record.table_name(), record.id(), &attrs, soft_delete)
            .await?;

        for (column, value) in &attrs {
            record.assign_column(column, value)?;
        }
        tracing::debug!(
            table = record.table_name(),
            id = record.id(),
            columns = attrs.len(),
            "record updated"
        );
        Ok(())
    }

    /// Delete `record`: soft when it has a `deleted_at` column, hard otherwise.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no live row matches.
    pub async fn delete<M: Model>(&self, record: &mut M) -> Result<(), DatabaseError> {
        require_id(record)?;
        let table = record.table_name();

        let affected = if record.columns().contains_key(DELETED_AT) {
            let now = datetime_value(&Utc::now());
            let affected = self
                .conn
                .execute(
                    &format!(
                        "UPDATE {table} SET {DELETED_AT} = ?1 WHERE id = ?2 AND {DELETED_AT} IS NULL"
                    ),
                    libsql::params![now.clone(), record.id()],
                )
                .await?;
            if affected > 0 {
                record.assign_column(DELETED_AT, &now)?;
            }
            affected
        } else {
            self.conn
                .execute(&format!("DELETE FROM {table} WHERE id = ?1"), [record.id()])
                .await?
        };

        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }
        tracing::debug!(table, id = record.id(), "record deleted");
        Ok(())
    }

    /// Load a live record by id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no live row matches.
    pub async fn find<T: Table>(&self, id: &str) -> Result<T, DatabaseError> {
        self.select_one(id, T::soft_delete()).await
    }

    /// Load a record by id, including soft-deleted rows.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no row matches.
    pub async fn find_unscoped<T: Table>(&self, id: &str) -> Result<T, DatabaseError> {
        self.select_one(id, false).await
    }

    /// Up to `limit` live records in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query or a row conversion fails.
    pub async fn list<T: Table>(&self, limit: u32) -> Result<Vec<T>, DatabaseError> {
        let filter = if T::soft_delete() {
            format!(" WHERE {DELETED_AT} IS NULL")
        } else {
            String::new()
        };
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {} FROM {}{filter} ORDER BY rowid LIMIT ?1",
                    T::COLUMNS.join(", "),
                    T::TABLE
                ),
                [i64::from(limit)],
            )
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(T::from_row(&row)?);
        }
        Ok(records)
    }

    async fn select_one<T: Table>(&self, id: &str, skip_deleted: bool) -> Result<T, DatabaseError> {
        let filter = if skip_deleted {
            format!(" AND {DELETED_AT} IS NULL")
        } else {
            String::new()
        };
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {} FROM {} WHERE id = ?1{filter}",
                    T::COLUMNS.join(", "),
                    T::TABLE
                ),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        T::from_row(&row)
    }

    async fn execute_update(
        &self,
        table: &str,
        id: &str,
        columns: &Columns,
        soft_delete: bool,
    ) -> Result<(), DatabaseError> {
        let mut sets = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        for (column, value) in columns.iter().filter(|(c, _)| c.as_str() != DELETED_AT) {
            params.push(value.clone());
            sets.push(format!("{column} = ?{}", params.len()));
        }
        if sets.is_empty() {
            return Ok(());
        }

        params.push(Value::Text(id.to_string()));
        let mut sql = format!(
            "UPDATE {table} SET {} WHERE id = ?{}",
            sets.join(", "),
            params.len()
        );
        if soft_delete {
            sql.push_str(&format!(" AND {DELETED_AT} IS NULL"));
        }

        let affected = self
            .conn
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }
}

fn require_id<M: Model + ?Sized>(record: &M) -> Result<(), DatabaseError> {
    if record.id().is_empty() {
        return Err(DatabaseError::InvalidState(format!(
            "cannot update a {} record that has no id",
            record.table_name()
        )));
    }
    Ok(())
}
