//! The in-flight write handed to every callback.

use std::fmt;

use audited_core::WriteContext;
use chrono::{DateTime, Utc};
use libsql::Value;

use crate::error::DatabaseError;
use crate::model::{Columns, Model};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Create,
    Update,
}

impl fmt::Display for WriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
        })
    }
}

/// A pending create or update.
///
/// Holds the record, the caller's [`WriteContext`], the column set that will
/// be written, and, for sparse updates, the partial-attribute map.
///
/// A sparse update writes only its attribute map: values set through
/// [`Scope::set_column`] during a sparse update reach the in-memory record
/// but are not persisted. Callbacks that must persist a column on every
/// update write to [`Scope::update_attrs_mut`] when it is present.
pub struct Scope<'a> {
    kind: WriteKind,
    record: &'a mut dyn Model,
    context: &'a WriteContext,
    columns: Columns,
    update_attrs: Option<Columns>,
    now: DateTime<Utc>,
}

impl<'a> Scope<'a> {
    pub fn new(kind: WriteKind, record: &'a mut dyn Model, context: &'a WriteContext) -> Self {
        let columns = record.columns();
        Self {
            kind,
            record,
            context,
            columns,
            update_attrs: None,
            now: Utc::now(),
        }
    }

    /// Turn this scope into a sparse update of `attrs`.
    #[must_use]
    pub fn with_update_attrs(mut self, attrs: Columns) -> Self {
        self.update_attrs = Some(attrs);
        self
    }

    #[must_use]
    pub const fn kind(&self) -> WriteKind {
        self.kind
    }

    #[must_use]
    pub fn table_name(&self) -> &'static str {
        self.record.table_name()
    }

    #[must_use]
    pub fn record(&self) -> &dyn Model {
        &*self.record
    }

    pub fn record_mut(&mut self) -> &mut dyn Model {
        &mut *self.record
    }

    #[must_use]
    pub const fn context(&self) -> &WriteContext {
        self.context
    }

    /// Timestamp shared by every callback of this write.
    #[must_use]
    pub const fn now(&self) -> DateTime<Utc> {
        self.now
    }

    #[must_use]
    pub const fn columns(&self) -> &Columns {
        &self.columns
    }

    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Set a column on the record and in the pending column set.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::UnknownColumn` if the record has no such
    /// column, or `DatabaseError::InvalidValue` if `value` does not fit it.
    pub fn set_column(&mut self, column: &str, value: Value) -> Result<(), DatabaseError> {
        if !self.record.assign_column(column, &value)? {
            return Err(DatabaseError::UnknownColumn {
                table: self.table_name().to_string(),
                column: column.to_string(),
            });
        }
        self.columns.insert(column.to_string(), value);
        Ok(())
    }

    /// The partial-attribute map, present only for sparse updates.
    #[must_use]
    pub const fn update_attrs(&self) -> Option<&Columns> {
        self.update_attrs.as_ref()
    }

    pub const fn update_attrs_mut(&mut self) -> Option<&mut Columns> {
        self.update_attrs.as_mut()
    }

    /// The full column set and the attribute map, once the chain has run.
    #[must_use]
    pub fn into_parts(self) -> (Columns, Option<Columns>) {
        (self.columns, self.update_attrs)
    }
}

impl fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("kind", &self.kind)
            .field("table", &self.table_name())
            .field("id", &self.record.id())
            .field("columns", &self.columns)
            .field("update_attrs", &self.update_attrs)
            .finish_non_exhaustive()
    }
}
