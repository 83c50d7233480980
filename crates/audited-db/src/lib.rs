//! # audited-db
//!
//! libSQL record layer with named create/update callback chains.
//!
//! Records describe themselves through [`model::Model`]; every create and
//! update builds a [`scope::Scope`] and runs it through the handle's
//! [`callbacks::Callbacks`] before any SQL executes. Callbacks can rewrite
//! the pending column set (or, for sparse updates, the partial-attribute
//! map), which is how the audit hooks stamp creator and updater columns.
//!
//! Uses the `libsql` crate (C `SQLite` fork) in local mode; `":memory:"`
//! gives a throwaway database for tests.

pub mod callbacks;
pub mod error;
pub mod helpers;
pub mod model;
mod schema;
pub mod scope;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
mod writes;

use error::DatabaseError;
use libsql::Builder;

use crate::callbacks::Callbacks;

pub use schema::audit_columns_ddl;

/// Database handle: a libSQL connection plus its callback chains.
pub struct AuditDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    callbacks: Callbacks,
}

impl AuditDb {
    /// Open a local database at the given path, with the default chains.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        tracing::debug!(path, "opened local database");
        Ok(Self {
            db,
            conn,
            callbacks: Callbacks::default(),
        })
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    #[must_use]
    pub const fn callbacks(&self) -> &Callbacks {
        &self.callbacks
    }

    /// Mutable access to the chains, for registering processors.
    pub const fn callbacks_mut(&mut self) -> &mut Callbacks {
        &mut self.callbacks
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"note-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query("SELECT ?1 || '-' || lower(hex(randomblob(4)))", [prefix])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::callbacks::{BEFORE_CREATE, BEFORE_UPDATE, UPDATE_TIME_STAMP};

    /// Helper to create an in-memory database for testing.
    async fn test_db() -> AuditDb {
        AuditDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_installs_default_chains() {
        let db = test_db().await;
        assert_eq!(
            db.callbacks().create().names(),
            [BEFORE_CREATE, UPDATE_TIME_STAMP]
        );
        assert_eq!(
            db.callbacks().update().names(),
            [BEFORE_UPDATE, UPDATE_TIME_STAMP]
        );
    }

    #[tokio::test]
    async fn open_local_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audited.db");
        let db = AuditDb::open_local(path.to_str().unwrap()).await.unwrap();
        db.conn()
            .execute("CREATE TABLE t (id TEXT PRIMARY KEY)", ())
            .await
            .unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("note").await.unwrap();
        assert!(id.starts_with("note-"), "ID should start with 'note-': {id}");
        assert_eq!(id.len(), 13, "ID should be 4 prefix + 1 dash + 8 hex: {id}");

        let hex_part = &id[5..];
        assert!(
            hex_part.chars().all(|c| c.is_ascii_hexdigit()),
            "Random part should be hex: {hex_part}"
        );
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("tst").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn generate_id_prefix_is_bound_not_spliced() {
        let db = test_db().await;
        let id = db.generate_id("it's").await.unwrap();
        assert!(id.starts_with("it's-"));
    }
}
