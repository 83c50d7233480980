use anyhow::Context;

use crate::context::AppContext;
use crate::note::Note;

pub async fn run(limit: u32, ctx: &AppContext) -> anyhow::Result<Vec<Note>> {
    ctx.db.list(limit).await.context("failed to list notes")
}
