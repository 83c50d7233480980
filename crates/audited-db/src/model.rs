//! Record description: how a Rust type maps onto a table.
//!
//! [`Model`] is object safe and is what the callback chains see through
//! [`Scope`](crate::scope::Scope). [`Table`] adds the static pieces needed to
//! load rows back.

use std::collections::BTreeMap;

use audited_core::columns::{
    CREATED_AT, CREATED_BY_ID, CREATED_BY_ROLE, DELETED_AT, PERSISTED, UPDATED_AT, UPDATED_BY_ID,
    UPDATED_BY_ROLE,
};
use audited_core::{AuditFields, Auditable};
use libsql::Value;

use crate::error::DatabaseError;
use crate::helpers::{
    datetime_value, opt_datetime_value, uuid_value, value_to_datetime, value_to_i64,
    value_to_opt_datetime, value_to_uuid,
};

/// Column name to value. Also the shape of a partial-attribute map.
pub type Columns = BTreeMap<String, Value>;

/// A persisted record.
pub trait Model: Send {
    fn table_name(&self) -> &'static str;

    /// Prefix for generated ids, e.g. `"note"` gives `note-3fa9c2d1`.
    fn id_prefix(&self) -> &'static str;

    /// Empty until the record has been created.
    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Every persisted column except `id`, with the record's current values.
    fn columns(&self) -> Columns;

    /// Write `value` into the field backing `column`.
    ///
    /// Returns `Ok(false)` when the record has no such column.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidValue` if `value` does not fit the field.
    fn assign_column(&mut self, column: &str, value: &Value) -> Result<bool, DatabaseError>;

    /// Runs as the built-in `orm:before_create` step.
    ///
    /// # Errors
    ///
    /// An error aborts the create.
    fn before_create(&mut self) -> Result<(), DatabaseError> {
        Ok(())
    }

    /// Runs as the built-in `orm:before_update` step.
    ///
    /// # Errors
    ///
    /// An error aborts the update.
    fn before_update(&mut self) -> Result<(), DatabaseError> {
        Ok(())
    }

    /// The auditable capability, if this record has it. Defaults to `None`.
    ///
    /// This is the only capability check the audit hooks make: overriding it
    /// is what makes a record auditable.
    fn as_auditable_mut(&mut self) -> Option<&mut dyn Auditable> {
        None
    }
}

/// A [`Model`] that can be loaded from its table.
pub trait Table: Model + Sized {
    const TABLE: &'static str;

    /// Selected columns, `id` first, in the order `from_row` reads them.
    const COLUMNS: &'static [&'static str];

    /// # Errors
    ///
    /// Returns `DatabaseError` if a column is missing or has the wrong type.
    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError>;

    /// Tables with a `deleted_at` column are soft-deleted.
    #[must_use]
    fn soft_delete() -> bool {
        Self::COLUMNS.contains(&DELETED_AT)
    }
}

/// The persisted audit columns of `fields`.
#[must_use]
pub fn audit_columns(fields: &AuditFields) -> Columns {
    Columns::from([
        (CREATED_AT.to_string(), datetime_value(&fields.created_at)),
        (CREATED_BY_ID.to_string(), uuid_value(fields.created_by_id)),
        (CREATED_BY_ROLE.to_string(), Value::Integer(fields.created_by_role)),
        (UPDATED_AT.to_string(), datetime_value(&fields.updated_at)),
        (UPDATED_BY_ID.to_string(), uuid_value(fields.updated_by_id)),
        (UPDATED_BY_ROLE.to_string(), Value::Integer(fields.updated_by_role)),
        (DELETED_AT.to_string(), opt_datetime_value(fields.deleted_at.as_ref())),
    ])
}

/// Assign an audit column onto `fields`. `Ok(false)` for non-audit columns.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidValue` if `value` does not fit the column.
pub fn assign_audit_column(
    fields: &mut AuditFields,
    column: &str,
    value: &Value,
) -> Result<bool, DatabaseError> {
    match column {
        CREATED_AT => fields.created_at = value_to_datetime(column, value)?,
        CREATED_BY_ID => fields.created_by_id = value_to_uuid(column, value)?,
        CREATED_BY_ROLE => fields.created_by_role = value_to_i64(column, value)?,
        UPDATED_AT => fields.updated_at = value_to_datetime(column, value)?,
        UPDATED_BY_ID => fields.updated_by_id = value_to_uuid(column, value)?,
        UPDATED_BY_ROLE => fields.updated_by_role = value_to_i64(column, value)?,
        DELETED_AT => fields.deleted_at = value_to_opt_datetime(column, value)?,
        _ => return Ok(false),
    }
    Ok(true)
}

/// Read the seven audit columns starting at `offset`, in `PERSISTED` order.
///
/// # Errors
///
/// Returns `DatabaseError` if a column read or conversion fails.
pub fn audit_fields_from_row(row: &libsql::Row, offset: i32) -> Result<AuditFields, DatabaseError> {
    let mut fields = AuditFields::default();
    for (idx, column) in (offset..).zip(PERSISTED) {
        let value = row.get_value(idx)?;
        assign_audit_column(&mut fields, column, &value)?;
    }
    Ok(fields)
}
