use anyhow::Context;

use crate::context::AppContext;
use crate::note::Note;

pub async fn run(title: &str, body: Option<&str>, ctx: &AppContext) -> anyhow::Result<Note> {
    let mut note = Note::new(title, body.map(String::from));
    ctx.db
        .create(&ctx.write_ctx, &mut note)
        .await
        .context("failed to create note")?;
    Ok(note)
}
