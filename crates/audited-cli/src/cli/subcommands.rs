use clap::Subcommand;

/// Note commands.
#[derive(Clone, Debug, Subcommand)]
pub enum NoteCommands {
    /// Create a note.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: Option<String>,
    },
    /// Update only the given fields of a note.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },
    /// Show a note by ID.
    Show {
        id: String,
        /// Also find soft-deleted notes.
        #[arg(long)]
        include_deleted: bool,
    },
    /// List live notes, oldest first.
    List {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Soft-delete a note.
    Delete { id: String },
}
