//! The `notes` table.

use audited_core::{AuditFields, Auditable, HasAuditFields};
use audited_db::AuditDb;
use audited_db::error::DatabaseError;
use audited_db::helpers::{opt_text_value, value_to_opt_string, value_to_string};
use audited_db::model::{
    Columns, Model, Table, assign_audit_column, audit_columns, audit_fields_from_row,
};
use libsql::Value;
use serde::Serialize;

pub const TITLE: &str = "title";
pub const BODY: &str = "body";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl Note {
    pub fn new(title: impl Into<String>, body: Option<String>) -> Self {
        Self {
            title: title.into(),
            body,
            ..Self::default()
        }
    }

    fn require_title(&self) -> Result<(), DatabaseError> {
        if self.title.trim().is_empty() {
            return Err(DatabaseError::InvalidState("note title is empty".into()));
        }
        Ok(())
    }

    /// Create the table if needed.
    pub async fn ensure_table(db: &AuditDb) -> Result<(), DatabaseError> {
        db.ensure_table(Self::TABLE, &["title TEXT NOT NULL", "body TEXT"], true)
            .await
    }
}

impl HasAuditFields for Note {
    fn audit_fields(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_fields_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

impl Model for Note {
    fn table_name(&self) -> &'static str {
        Self::TABLE
    }

    fn id_prefix(&self) -> &'static str {
        "note"
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn columns(&self) -> Columns {
        let mut columns = audit_columns(&self.audit);
        columns.insert(TITLE.into(), Value::Text(self.title.clone()));
        columns.insert(BODY.into(), opt_text_value(self.body.as_deref()));
        columns
    }

    fn assign_column(&mut self, column: &str, value: &Value) -> Result<bool, DatabaseError> {
        match column {
            TITLE => self.title = value_to_string(column, value)?,
            BODY => self.body = value_to_opt_string(column, value)?,
            _ => return assign_audit_column(&mut self.audit, column, value),
        }
        Ok(true)
    }

    fn before_create(&mut self) -> Result<(), DatabaseError> {
        self.require_title()
    }

    fn before_update(&mut self) -> Result<(), DatabaseError> {
        self.require_title()
    }

    fn as_auditable_mut(&mut self) -> Option<&mut dyn Auditable> {
        Some(self)
    }
}

impl Table for Note {
    const TABLE: &'static str = "notes";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        TITLE,
        BODY,
        "created_at",
        "created_by_id",
        "created_by_role",
        "updated_at",
        "updated_by_id",
        "updated_by_role",
        "deleted_at",
    ];

    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            body: value_to_opt_string(BODY, &row.get_value(2)?)?,
            audit: audit_fields_from_row(row, 3)?,
        })
    }
}
