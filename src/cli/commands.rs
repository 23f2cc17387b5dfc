use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pm", about = concat!("pm v", env!("CARGO_PKG_VERSION"), " - projects, tasks and the week ahead"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Keep the local store in a different directory
    #[arg(long = "data-dir", global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List, create and arrange projects
    Project(ProjectCmd),
    /// List, create and edit tasks in a project
    Task(TaskCmd),
    /// Show the week's tasks as a calendar
    Week(WeekArgs),
    /// Show the average task progress of a project
    Progress(ProgressArgs),
    /// Write every project to a JSON document
    Export(ExportArgs),
    /// Replace every project with the contents of a JSON document
    Import(ImportArgs),
    /// Reconcile with the cloud copy and push pending changes
    Sync,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ProjectCmd {
    #[command(subcommand)]
    pub action: Option<ProjectAction>,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// List projects (default)
    List,
    /// Create a project at the end of the list
    Add(ProjectAddArgs),
    /// Rename a project
    Rename(ProjectRenameArgs),
    /// Change a project's emoji
    Emoji(ProjectEmojiArgs),
    /// Delete a project and its tasks
    Rm(PositionArg),
    /// Move a project to a new position
    Mv(MoveArgs),
    /// Select the project that task commands act on
    Select(ProjectSelectArgs),
}

#[derive(Args)]
pub struct ProjectAddArgs {
    /// Project name
    pub name: String,
    /// Emoji shown next to the name
    #[arg(long)]
    pub emoji: Option<String>,
}

#[derive(Args)]
pub struct ProjectRenameArgs {
    /// Project position (1-indexed)
    pub position: usize,
    /// New name
    pub name: String,
}

#[derive(Args)]
pub struct ProjectEmojiArgs {
    /// Project position (1-indexed)
    pub position: usize,
    /// New emoji
    pub emoji: String,
}

#[derive(Args)]
pub struct ProjectSelectArgs {
    /// Project position (1-indexed)
    pub position: Option<usize>,
    /// Clear the selection instead
    #[arg(long, conflicts_with = "position")]
    pub clear: bool,
}

#[derive(Args)]
pub struct PositionArg {
    /// Position (1-indexed)
    pub position: usize,
}

#[derive(Args)]
pub struct MoveArgs {
    /// Current position (1-indexed)
    pub from: usize,
    /// New position (1-indexed)
    pub to: usize,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TaskCmd {
    #[command(subcommand)]
    pub action: Option<TaskAction>,
    /// Project to act on (1-indexed; default: the selected project)
    #[arg(short, long, global = true)]
    pub project: Option<usize>,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// List the project's tasks (default)
    List,
    /// Add a task at the end of the project
    Add(TaskAddArgs),
    /// Change one field of a task
    Set(TaskSetArgs),
    /// Delete a task
    Rm(PositionArg),
    /// Move a task to a new position
    Mv(MoveArgs),
}

#[derive(Args)]
pub struct TaskAddArgs {
    /// Task title
    pub title: String,
    /// Longer description
    #[arg(long, short)]
    pub description: Option<String>,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,
    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,
    /// Progress percentage (clamped to 0-100)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub progress: i64,
}

#[derive(Args)]
pub struct TaskSetArgs {
    /// Task position (1-indexed)
    pub position: usize,
    /// Field to change (title, description, start, end, progress)
    pub field: String,
    /// New value (empty string clears a date)
    #[arg(allow_hyphen_values = true)]
    pub value: String,
}

// ---------------------------------------------------------------------------
// Views and transfer
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct WeekArgs {
    /// Any day in the week to show (YYYY-MM-DD, default: today)
    #[arg(long)]
    pub date: Option<String>,
    /// Shift by this many weeks (negative goes back)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub offset: i64,
}

#[derive(Args)]
pub struct ProgressArgs {
    /// Project position (1-indexed; default: the selected project)
    pub position: Option<usize>,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Write to this file instead of stdout
    #[arg(long, short)]
    pub out: Option<PathBuf>,
    /// Free-form note stored in the document
    #[arg(long)]
    pub note: Option<String>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// JSON document to import
    pub file: PathBuf,
}
