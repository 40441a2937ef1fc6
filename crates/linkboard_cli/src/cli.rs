use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use linkboard_core::config::{
    ENV_API_BASE, ENV_BACKEND, ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL, ENV_SEED_DIR,
};

#[derive(Debug, Parser)]
#[command(name = "linkboard")]
#[command(version)]
#[command(about = "Inspect and edit a linkboard from the command line")]
pub struct Cli {
    #[arg(
        long,
        help = "Act as an editor (required for every mutating command)."
    )]
    pub editor: bool,

    #[arg(short = 'y', long, help = "Answer yes to every confirmation.")]
    pub yes: bool,

    #[command(flatten)]
    pub settings: BoardSettings,

    #[command(subcommand)]
    pub command: Commands,
}

/// Backend and logging settings; each flag falls back to its environment
/// variable.
#[derive(Debug, Args)]
pub struct BoardSettings {
    #[arg(
        long,
        global = true,
        env = "LINKBOARD_BACKEND",
        help = "Backend: local, rest or realtime."
    )]
    pub backend: Option<String>,

    #[arg(
        long,
        global = true,
        env = "LINKBOARD_DB_PATH",
        help = "Local store file; omitted keeps the store in memory."
    )]
    pub db: Option<String>,

    #[arg(
        long,
        global = true,
        env = "LINKBOARD_SEED_DIR",
        help = "Directory holding links.json and notice.txt to seed an empty local store."
    )]
    pub seed_dir: Option<String>,

    #[arg(
        long,
        global = true,
        env = "LINKBOARD_API_BASE",
        help = "Base URL of the board server for the rest backend."
    )]
    pub api_base: Option<String>,

    #[arg(long, global = true, env = "LINKBOARD_LOG_LEVEL", help = "Log level.")]
    pub log_level: Option<String>,

    #[arg(
        long,
        global = true,
        env = "LINKBOARD_LOG_DIR",
        help = "Absolute directory for rolling log files; omitted disables logging."
    )]
    pub log_dir: Option<String>,
}

impl BoardSettings {
    /// Looks a setting up by its environment variable name.
    pub fn lookup(&self, key: &str) -> Option<String> {
        let value = match key {
            ENV_BACKEND => &self.backend,
            ENV_DB_PATH => &self.db,
            ENV_SEED_DIR => &self.seed_dir,
            ENV_API_BASE => &self.api_base,
            ENV_LOG_LEVEL => &self.log_level,
            ENV_LOG_DIR => &self.log_dir,
            _ => return None,
        };
        value.clone()
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Print the core version.")]
    Version,
    #[command(about = "List links (newest first) and notices.")]
    List,
    #[command(about = "Print the rendered board as HTML.")]
    Html,
    #[command(about = "Write links.json and notice.txt into a directory.")]
    Export(ExportArgs),
    #[command(about = "Publish a link.")]
    Add(AddArgs),
    #[command(about = "Publish a notice.")]
    Notice(NoticeArgs),
    #[command(about = "Set the note of a link.")]
    Note(NoteArgs),
    #[command(about = "Delete a link.")]
    DeleteLink(IdArgs),
    #[command(about = "Delete a notice.")]
    DeleteNotice(IdArgs),
    #[command(about = "Delete every notice.")]
    ClearNotices,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[arg(long, default_value = ".", help = "Output directory.")]
    pub out: PathBuf,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub url: String,
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, help = "Image URL or data URI.")]
    pub image: Option<String>,
    #[arg(long, help = "Note; a dated note is also published as a notice.")]
    pub note: Option<String>,
}

#[derive(Debug, Args)]
pub struct NoticeArgs {
    pub text: String,
}

#[derive(Debug, Args)]
pub struct NoteArgs {
    pub id: String,
    pub note: String,
    #[arg(long, help = "Also publish a dated note as a notice.")]
    pub sync: bool,
}

#[derive(Debug, Args)]
pub struct IdArgs {
    pub id: String,
}
