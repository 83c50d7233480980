//! Shared record types and database fixtures for tests.
//!
//! Enabled inside this crate's own tests and, for dependent crates, through
//! the `test-support` feature.

use audited_core::{AuditFields, Auditable, HasAuditFields};
use libsql::Value;

use crate::AuditDb;
use crate::error::DatabaseError;
use crate::helpers::{opt_text_value, value_to_opt_string, value_to_string};
use crate::model::{
    Columns, Model, Table, assign_audit_column, audit_columns, audit_fields_from_row,
};

/// Auditable, soft-deletable record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub body: Option<String>,
    pub audit: AuditFields,
}

impl Note {
    pub fn new(title: &str, body: Option<&str>) -> Self {
        Self {
            title: title.to_string(),
            body: body.map(String::from),
            ..Default::default()
        }
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
        columns.insert("title".into(), Value::Text(self.title.clone()));
        columns.insert("body".into(), opt_text_value(self.body.as_deref()));
        columns
    }

    fn assign_column(&mut self, column: &str, value: &Value) -> Result<bool, DatabaseError> {
        match column {
            "title" => self.title = value_to_string(column, value)?,
            "body" => self.body = value_to_opt_string(column, value)?,
            _ => return assign_audit_column(&mut self.audit, column, value),
        }
        Ok(true)
    }

    fn as_auditable_mut(&mut self) -> Option<&mut dyn Auditable> {
        Some(self)
    }
}

impl Table for Note {
    const TABLE: &'static str = "notes";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "body",
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
            body: value_to_opt_string("body", &row.get_value(2)?)?,
            audit: audit_fields_from_row(row, 3)?,
        })
    }
}

/// Plain record: hard-deleted, lowercases its name on create.
///
/// Has a `created_by_id` column of its own but is not auditable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub created_by_id: String,
}

impl Tag {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

impl Model for Tag {
    fn table_name(&self) -> &'static str {
        Self::TABLE
    }

    fn id_prefix(&self) -> &'static str {
        "tag"
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn columns(&self) -> Columns {
        Columns::from([
            ("name".to_string(), Value::Text(self.name.clone())),
            (
                "created_by_id".to_string(),
                Value::Text(self.created_by_id.clone()),
            ),
        ])
    }

    fn assign_column(&mut self, column: &str, value: &Value) -> Result<bool, DatabaseError> {
        match column {
            "name" => self.name = value_to_string(column, value)?,
            "created_by_id" => self.created_by_id = value_to_string(column, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn before_create(&mut self) -> Result<(), DatabaseError> {
        if self.name.trim().is_empty() {
            return Err(DatabaseError::InvalidState("tag name is empty".into()));
        }
        self.name = self.name.trim().to_lowercase();
        Ok(())
    }
}

impl Table for Tag {
    const TABLE: &'static str = "tags";
    const COLUMNS: &'static [&'static str] = &["id", "name", "created_by_id"];

    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            created_by_id: row.get(2)?,
        })
    }
}

/// In-memory database with the `notes` and `tags` tables and the default
/// chains only.
///
/// # Panics
///
/// Panics if the database cannot be opened or a table cannot be created.
pub async fn test_db() -> AuditDb {
    let db = AuditDb::open_local(":memory:").await.unwrap();
    db.ensure_table(Note::TABLE, &["title TEXT NOT NULL", "body TEXT"], true)
        .await
        .unwrap();
    db.ensure_table(
        Tag::TABLE,
        &["name TEXT NOT NULL", "created_by_id TEXT NOT NULL DEFAULT ''"],
        false,
    )
    .await
    .unwrap();
    db
}

/// # Panics
///
/// Panics if the count query fails.
pub async fn count_rows(db: &AuditDb, table: &str) -> i64 {
    let mut rows = db
        .conn()
        .query(&format!("SELECT COUNT(*) FROM {table}"), ())
        .await
        .unwrap();
    rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
}
