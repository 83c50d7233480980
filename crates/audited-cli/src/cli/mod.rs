use clap::{Parser, Subcommand};
use uuid::Uuid;

pub mod global;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use subcommands::NoteCommands;

/// Top-level CLI parser for the `audited` binary.
#[derive(Debug, Parser)]
#[command(name = "audited", version, about = "Records with creator/updater audit stamping")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database path (overrides `database.path`)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Act as this user (UUID) for writes
    #[arg(long, global = true)]
    pub as_user: Option<Uuid>,

    /// Role of the acting user
    #[arg(long, global = true, default_value_t = 0, requires = "as_user")]
    pub as_role: i64,
}

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Notes.
    Note {
        #[command(subcommand)]
        action: NoteCommands,
    },
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            db: self.db.clone(),
            as_user: self.as_user,
            as_role: self.as_role,
        }
    }
}
