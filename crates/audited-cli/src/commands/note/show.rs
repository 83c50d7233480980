use anyhow::Context;

use crate::context::AppContext;
use crate::note::Note;

pub async fn run(id: &str, include_deleted: bool, ctx: &AppContext) -> anyhow::Result<Note> {
    let found: Result<Note, _> = if include_deleted {
        ctx.db.find_unscoped(id).await
    } else {
        ctx.db.find(id).await
    };
    found.with_context(|| format!("note '{id}' not found"))
}
