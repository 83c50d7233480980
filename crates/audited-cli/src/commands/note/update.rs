use anyhow::Context;
use audited_db::model::Columns;
use libsql::Value;

use crate::context::AppContext;
use crate::note::{BODY, Note, TITLE};

/// Sparse update: only the given fields are written.
pub async fn run(
    id: &str,
    title: Option<&str>,
    body: Option<&str>,
    ctx: &AppContext,
) -> anyhow::Result<Note> {
    if title.is_none() && body.is_none() {
        anyhow::bail!("At least one of --title or --body must be provided");
    }

    let mut note: Note = ctx
        .db
        .find(id)
        .await
        .with_context(|| format!("note '{id}' not found"))?;

    let mut attrs = Columns::new();
    if let Some(title) = title {
        attrs.insert(TITLE.to_string(), Value::Text(title.to_string()));
    }
    if let Some(body) = body {
        attrs.insert(BODY.to_string(), Value::Text(body.to_string()));
    }

    ctx.db
        .update_columns(&ctx.write_ctx, &mut note, attrs)
        .await
        .with_context(|| format!("failed to update note '{id}'"))?;
    Ok(note)
}
