use anyhow::Context;
use serde_json::{Value, json};

use crate::context::AppContext;
use crate::note::Note;

pub async fn run(id: &str, ctx: &AppContext) -> anyhow::Result<Value> {
    let mut note: Note = ctx
        .db
        .find(id)
        .await
        .with_context(|| format!("note '{id}' not found"))?;
    ctx.db
        .delete(&mut note)
        .await
        .with_context(|| format!("failed to delete note '{id}'"))?;

    Ok(json!({
        "deleted": note.id,
        "deleted_at": note.audit.deleted_at,
    }))
}
