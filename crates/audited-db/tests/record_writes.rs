//! Record layer integration tests:
//! - create / save / sparse update / delete against libSQL
//! - soft-delete scoping for tables with `deleted_at`
//! - callback chains: model hooks, errors, and the sparse-update column rule

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use audited_core::WriteContext;
use audited_db::callbacks::BEFORE_UPDATE;
use audited_db::error::DatabaseError;
use audited_db::model::Columns;
use audited_db::test_support::{Note, Tag, count_rows, test_db};
use chrono::{DateTime, Utc};
use libsql::Value;
use pretty_assertions::assert_eq;

fn attrs(pairs: &[(&str, Value)]) -> Columns {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_assigns_id_and_timestamps() {
    let db = test_db().await;
    let before = Utc::now();
    let mut note = Note::new("groceries", Some("milk"));

    db.create(&WriteContext::new(), &mut note).await.unwrap();

    assert!(note.id.starts_with("note-"), "unexpected id {}", note.id);
    assert!(note.audit.created_at.timestamp() >= before.timestamp());
    assert_eq!(note.audit.created_at, note.audit.updated_at);

    let stored: Note = db.find(&note.id).await.unwrap();
    assert_eq!(stored.title, "groceries");
    assert_eq!(stored.body.as_deref(), Some("milk"));
    assert_eq!(
        stored.audit.created_at.timestamp(),
        note.audit.created_at.timestamp()
    );
    assert!(stored.audit.created_by_id.is_nil());
    assert_eq!(stored.audit.deleted_at, None);
}

#[tokio::test]
async fn create_keeps_caller_supplied_id() {
    let db = test_db().await;
    let mut tag = Tag {
        id: "tag-fixed001".into(),
        name: "Rust".into(),
        ..Tag::default()
    };
    db.create(&WriteContext::new(), &mut tag).await.unwrap();

    let stored: Tag = db.find("tag-fixed001").await.unwrap();
    assert_eq!(stored.name, "rust");
}

#[tokio::test]
async fn before_create_error_aborts_the_insert() {
    let db = test_db().await;
    let mut tag = Tag::new("   ");

    let err = db.create(&WriteContext::new(), &mut tag).await.unwrap_err();

    assert!(matches!(err, DatabaseError::InvalidState(_)));
    assert!(tag.id.is_empty());
    assert_eq!(count_rows(&db, "tags").await, 0);
}

#[tokio::test]
async fn failing_callback_stops_the_chain() {
    let mut db = test_db().await;
    db.callbacks_mut()
        .create_mut()
        .register("test:reject", |_scope| {
            Err(DatabaseError::InvalidState("rejected".into()))
        });

    let mut note = Note::new("never stored", None);
    assert!(db.create(&WriteContext::new(), &mut note).await.is_err());
    assert_eq!(count_rows(&db, "notes").await, 0);
}

// ---------------------------------------------------------------------------
// Save (full row)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn save_writes_every_column_and_bumps_updated_at() {
    let db = test_db().await;
    let mut note = Note::new("draft", Some("v1"));
    db.create(&WriteContext::new(), &mut note).await.unwrap();
    let created_at = note.audit.created_at;

    note.title = "final".into();
    note.body = None;
    db.save(&WriteContext::new(), &mut note).await.unwrap();

    let stored: Note = db.find(&note.id).await.unwrap();
    assert_eq!(stored.title, "final");
    assert_eq!(stored.body, None);
    assert_eq!(stored.audit.created_at.timestamp(), created_at.timestamp());
    assert!(stored.audit.updated_at >= created_at);
}

#[tokio::test]
async fn save_without_id_is_rejected() {
    let db = test_db().await;
    let mut note = Note::new("unsaved", None);
    let err = db.save(&WriteContext::new(), &mut note).await.unwrap_err();
    assert!(matches!(err, DatabaseError::InvalidState(_)));
}

#[tokio::test]
async fn save_of_missing_row_is_no_result() {
    let db = test_db().await;
    let mut note = Note::new("ghost", None);
    note.id = "note-00000000".into();
    let err = db.save(&WriteContext::new(), &mut note).await.unwrap_err();
    assert!(matches!(err, DatabaseError::NoResult));
}

// ---------------------------------------------------------------------------
// Sparse update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_columns_only_touches_named_columns() {
    let db = test_db().await;
    let mut note = Note::new("title", Some("body"));
    db.create(&WriteContext::new(), &mut note).await.unwrap();

    // In-memory edits outside the attribute map must not be written.
    note.body = Some("local edit".into());
    db.update_columns(
        &WriteContext::new(),
        &mut note,
        attrs(&[("title", Value::Text("renamed".into()))]),
    )
    .await
    .unwrap();

    assert_eq!(note.title, "renamed");
    let stored: Note = db.find(&note.id).await.unwrap();
    assert_eq!(stored.title, "renamed");
    assert_eq!(stored.body.as_deref(), Some("body"));
}

#[tokio::test]
async fn update_columns_sets_updated_at_through_the_map() {
    let db = test_db().await;
    let mut note = Note::new("t", None);
    db.create(&WriteContext::new(), &mut note).await.unwrap();
    let stale: DateTime<Utc> = DateTime::UNIX_EPOCH;
    db.conn()
        .execute(
            "UPDATE notes SET updated_at = ?1 WHERE id = ?2",
            libsql::params![stale.to_rfc3339(), note.id.as_str()],
        )
        .await
        .unwrap();

    db.update_columns(
        &WriteContext::new(),
        &mut note,
        attrs(&[("title", Value::Text("t2".into()))]),
    )
    .await
    .unwrap();

    let stored: Note = db.find(&note.id).await.unwrap();
    assert!(stored.audit.updated_at > stale);
}

#[tokio::test]
async fn update_columns_with_empty_map_is_a_noop() {
    let db = test_db().await;
    let mut note = Note::new("same", None);
    db.create(&WriteContext::new(), &mut note).await.unwrap();
    let before: Note = db.find(&note.id).await.unwrap();

    db.update_columns(&WriteContext::new(), &mut note, Columns::new())
        .await
        .unwrap();

    let after: Note = db.find(&note.id).await.unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn update_columns_rejects_unknown_columns() {
    let db = test_db().await;
    let mut note = Note::new("n", None);
    db.create(&WriteContext::new(), &mut note).await.unwrap();

    let err = db
        .update_columns(
            &WriteContext::new(),
            &mut note,
            attrs(&[("title; DROP TABLE notes", Value::Null)]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DatabaseError::UnknownColumn { .. }));
    assert_eq!(count_rows(&db, "notes").await, 1);
}

#[tokio::test]
async fn unknown_column_is_rejected_before_any_callback_runs() {
    let mut db = test_db().await;
    let ran = Arc::new(AtomicBool::new(false));
    let seen = Arc::clone(&ran);
    db.callbacks_mut()
        .update_mut()
        .register("test:observe", move |_scope| {
            seen.store(true, Ordering::SeqCst);
            Ok(())
        });

    let mut note = Note::new("n", None);
    db.create(&WriteContext::new(), &mut note).await.unwrap();
    let updated_at = note.audit.updated_at;

    let err = db
        .update_columns(
            &WriteContext::new(),
            &mut note,
            attrs(&[
                ("title", Value::Text("half applied".into())),
                ("colour", Value::Text("red".into())),
            ]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DatabaseError::UnknownColumn { ref column, .. } if column == "colour"));
    assert!(!ran.load(Ordering::SeqCst));
    assert_eq!(note.title, "n");
    assert_eq!(note.audit.updated_at, updated_at);
}

#[tokio::test]
async fn direct_column_sets_are_dropped_by_sparse_updates() {
    let mut db = test_db().await;
    db.callbacks_mut()
        .update_mut()
        .after(BEFORE_UPDATE)
        .register("test:force_body", |scope| {
            scope.set_column("body", Value::Text("forced".into()))
        });

    let mut note = Note::new("n", Some("original"));
    db.create(&WriteContext::new(), &mut note).await.unwrap();

    db.update_columns(
        &WriteContext::new(),
        &mut note,
        attrs(&[("title", Value::Text("n2".into()))]),
    )
    .await
    .unwrap();
    let stored: Note = db.find(&note.id).await.unwrap();
    assert_eq!(stored.body.as_deref(), Some("original"));

    // A full-row save carries the directly set column.
    db.save(&WriteContext::new(), &mut note).await.unwrap();
    let stored: Note = db.find(&note.id).await.unwrap();
    assert_eq!(stored.body.as_deref(), Some("forced"));
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn soft_delete_hides_the_row_from_scoped_reads() {
    let db = test_db().await;
    let mut keep = Note::new("keep", None);
    let mut gone = Note::new("gone", None);
    db.create(&WriteContext::new(), &mut keep).await.unwrap();
    db.create(&WriteContext::new(), &mut gone).await.unwrap();

    db.delete(&mut gone).await.unwrap();

    assert!(gone.audit.deleted_at.is_some());
    assert!(matches!(
        db.find::<Note>(&gone.id).await,
        Err(DatabaseError::NoResult)
    ));
    let listed: Vec<Note> = db.list(10).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, keep.id);

    let unscoped: Note = db.find_unscoped(&gone.id).await.unwrap();
    assert!(unscoped.audit.deleted_at.is_some());
    assert_eq!(count_rows(&db, "notes").await, 2);
}

#[tokio::test]
async fn soft_deleted_rows_reject_updates_and_second_delete() {
    let db = test_db().await;
    let mut note = Note::new("n", None);
    db.create(&WriteContext::new(), &mut note).await.unwrap();
    db.delete(&mut note).await.unwrap();

    let err = db
        .update_columns(
            &WriteContext::new(),
            &mut note,
            attrs(&[("title", Value::Text("zombie".into()))]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::NoResult));
    assert!(matches!(db.delete(&mut note).await, Err(DatabaseError::NoResult)));
}

#[tokio::test]
async fn plain_tables_are_hard_deleted() {
    let db = test_db().await;
    let mut tag = Tag::new("temp");
    db.create(&WriteContext::new(), &mut tag).await.unwrap();

    db.delete(&mut tag).await.unwrap();

    assert_eq!(count_rows(&db, "tags").await, 0);
    assert!(db.find_unscoped::<Tag>(&tag.id).await.is_err());
}

#[tokio::test]
async fn list_respects_limit_and_insertion_order() {
    let db = test_db().await;
    for name in ["a", "b", "c"] {
        db.create(&WriteContext::new(), &mut Tag::new(name))
            .await
            .unwrap();
    }
    let tags: Vec<Tag> = db.list(2).await.unwrap();
    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["a", "b"]);
}
