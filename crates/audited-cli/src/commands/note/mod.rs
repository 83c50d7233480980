mod create;
mod delete;
mod list;
mod show;
mod update;

use crate::cli::{GlobalFlags, NoteCommands};
use crate::context::AppContext;
use crate::output::output;

/// Handle `audited note`.
pub async fn handle(
    action: &NoteCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let response = match action {
        NoteCommands::Create { title, body } => {
            serde_json::to_value(create::run(title, body.as_deref(), ctx).await?)?
        }
        NoteCommands::Update { id, title, body } => {
            serde_json::to_value(update::run(id, title.as_deref(), body.as_deref(), ctx).await?)?
        }
        NoteCommands::Show {
            id,
            include_deleted,
        } => serde_json::to_value(show::run(id, *include_deleted, ctx).await?)?,
        NoteCommands::List { limit } => serde_json::to_value(list::run(*limit, ctx).await?)?,
        NoteCommands::Delete { id } => delete::run(id, ctx).await?,
    };
    output(&response, flags.format)
}
