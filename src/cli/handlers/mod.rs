mod views;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::local_store::FileKv;
use crate::model::config::PlannerConfig;
use crate::model::task::{NewTask, TaskField};
use crate::store::{CloudSync, PlannerStore};
use crate::sync::remote::{Anonymous, FileRemote, IdentityProvider, StaticIdentity};
use crate::sync::resolve::Resolution;
use crate::util::clock::SystemClock;
use crate::util::dates::parse_date_input;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// An open store plus what the command needs to know about its setup
struct Session {
    store: PlannerStore,
    config: PlannerConfig,
    resolution: Resolution,
    json: bool,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub async fn dispatch(cli: Cli) -> CmdResult {
    let mut session = open_session(&cli).await?;

    let result = match cli.command {
        Commands::Project(cmd) => cmd_project(&mut session, cmd),
        Commands::Task(cmd) => cmd_task(&mut session, cmd),
        Commands::Week(args) => views::cmd_week(&session, args),
        Commands::Progress(args) => views::cmd_progress(&session, args),
        Commands::Export(args) => views::cmd_export(&session, args),
        Commands::Import(args) => views::cmd_import(&mut session, args),
        Commands::Sync => cmd_sync(&session),
    };

    // Pending remote writes land before the process exits, even on error
    session.store.flush().await;
    result
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn open_session(cli: &Cli) -> Result<Session, Box<dyn std::error::Error>> {
    let config = config_io::read_config(cli.config.as_deref())?;
    let data_dir = config.resolve_data_dir(cli.data_dir.as_deref());
    tracing::debug!(data_dir = %data_dir.display(), "opening local store");

    let mut store = PlannerStore::open(Box::new(FileKv::open(&data_dir)));
    if let Some(sync) = cloud_sync(&config, &data_dir) {
        store.attach_sync(sync);
    }
    let resolution = store.connect().await;

    Ok(Session {
        store,
        config,
        resolution,
        json: cli.json,
    })
}

fn cloud_sync(config: &PlannerConfig, data_dir: &Path) -> Option<CloudSync> {
    if !config.sync.enabled {
        return None;
    }
    let identity: Arc<dyn IdentityProvider> = match config.sync.user_id.as_deref() {
        Some(uid) if !uid.trim().is_empty() => {
            let name = config.sync.display_name.as_deref().unwrap_or(uid);
            Arc::new(StaticIdentity::signed_in(uid.trim(), name))
        }
        _ => Arc::new(Anonymous),
    };
    let remote = FileRemote::new(&config.resolve_remote_dir(data_dir), Arc::new(SystemClock));
    Some(
        CloudSync::new(identity, Arc::new(remote))
            .with_window(Duration::from_millis(config.sync.debounce_ms)),
    )
}

/// Convert a 1-indexed CLI position to a list index.
fn to_index(position: usize) -> Result<usize, String> {
    position
        .checked_sub(1)
        .ok_or_else(|| "positions start at 1".to_string())
}

/// The project a task command acts on: `--project`, else the selection.
fn target_project(session: &Session, position: Option<usize>) -> Result<usize, Box<dyn std::error::Error>> {
    let index = match position {
        Some(p) => to_index(p)?,
        None => session.store.active_index()?,
    };
    if index >= session.store.projects().len() {
        return Err(format!("no project at position {}", index + 1).into());
    }
    Ok(index)
}

/// Reject date text that does not parse; empty means unset.
fn check_date(text: &str) -> Result<(), String> {
    if text.is_empty() || parse_date_input(text).is_some() {
        Ok(())
    } else {
        Err(format!("invalid date '{}' (expected YYYY-MM-DD)", text))
    }
}

fn print_moved(moved: bool) {
    if !moved {
        println!("nothing to move");
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

fn cmd_project(session: &mut Session, cmd: ProjectCmd) -> CmdResult {
    match cmd.action.unwrap_or(ProjectAction::List) {
        ProjectAction::List => cmd_project_list(session),
        ProjectAction::Add(args) => {
            let index = session.store.add_project(&args.name)?;
            if let Some(ref emoji) = args.emoji {
                session.store.set_project_emoji(index, emoji)?;
            }
            println!("{}", index + 1);
            Ok(())
        }
        ProjectAction::Rename(args) => {
            session.store.rename_project(to_index(args.position)?, &args.name)?;
            Ok(())
        }
        ProjectAction::Emoji(args) => {
            session.store.set_project_emoji(to_index(args.position)?, &args.emoji)?;
            Ok(())
        }
        ProjectAction::Rm(args) => {
            let removed = session.store.delete_project(to_index(args.position)?)?;
            println!("deleted {}", removed.name);
            Ok(())
        }
        ProjectAction::Mv(args) => {
            let moved = session
                .store
                .move_project(to_index(args.from)?, to_index(args.to)?);
            print_moved(moved);
            Ok(())
        }
        ProjectAction::Select(args) => {
            let index = match (args.clear, args.position) {
                (true, _) => None,
                (false, Some(p)) => Some(to_index(p)?),
                (false, None) => return Err("give a position or --clear".into()),
            };
            session.store.select_project(index)?;
            Ok(())
        }
    }
}

fn cmd_project_list(session: &Session) -> CmdResult {
    let state = session.store.state();
    let active = |i: usize| state.active == Some(i);
    if session.json {
        let projects: Vec<ProjectJson> = state
            .projects
            .iter()
            .enumerate()
            .map(|(i, p)| project_to_json(i, p, active(i)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&projects)?);
    } else if state.projects.is_empty() {
        println!("no projects yet (try `pm project add NAME`)");
    } else {
        for (i, p) in state.projects.iter().enumerate() {
            println!("{}", format_project_line(i, p, active(i)));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

fn cmd_task(session: &mut Session, cmd: TaskCmd) -> CmdResult {
    let project = target_project(session, cmd.project)?;
    match cmd.action.unwrap_or(TaskAction::List) {
        TaskAction::List => cmd_task_list(session, project),
        TaskAction::Add(args) => {
            let start = args.start.unwrap_or_default();
            let end = args.end.unwrap_or_default();
            check_date(&start)?;
            check_date(&end)?;
            let id = session.store.add_task(
                project,
                NewTask {
                    title: args.title,
                    description: args.description.unwrap_or_default(),
                    start,
                    end,
                    progress: args.progress,
                },
            )?;
            println!("{}", id);
            Ok(())
        }
        TaskAction::Set(args) => {
            let field = TaskField::parse(&args.field, &args.value).ok_or_else(|| {
                format!(
                    "cannot set '{}' to '{}' (fields: title, description, start, end, progress)",
                    args.field, args.value
                )
            })?;
            if let TaskField::Start(ref d) | TaskField::End(ref d) = field {
                check_date(d)?;
            }
            session.store.update_task(project, to_index(args.position)?, field)?;
            Ok(())
        }
        TaskAction::Rm(args) => {
            session.store.delete_task(project, to_index(args.position)?)?;
            Ok(())
        }
        TaskAction::Mv(args) => {
            let moved = session
                .store
                .move_task(project, to_index(args.from)?, to_index(args.to)?)?;
            print_moved(moved);
            Ok(())
        }
    }
}

fn cmd_task_list(session: &Session, project: usize) -> CmdResult {
    let p = &session.store.projects()[project];
    let progress = session.store.average_progress(project)?;
    if session.json {
        let out = TaskListJson {
            project: p.name.clone(),
            progress,
            tasks: p.tasks.iter().enumerate().map(|(i, t)| task_to_json(i, t)).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{} {}  ({}%)", p.emoji, p.name, progress);
        if p.tasks.is_empty() {
            println!("  no tasks");
        }
        for (i, t) in p.tasks.iter().enumerate() {
            println!("  {}", format_task_line(i, t));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

fn cmd_sync(session: &Session) -> CmdResult {
    let user = session.store.user();
    if session.json {
        let out = serde_json::json!({
            "resolution": session.resolution,
            "user": user,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    let message = match session.resolution {
        Resolution::LocalOnly if !session.config.sync.enabled => "sync is disabled",
        Resolution::LocalOnly => "no user configured, staying local",
        Resolution::RemoteUnavailable => "remote store unavailable, kept local copy",
        Resolution::SkippedDirty => "local edits pending, remote copy ignored",
        Resolution::AlreadyResolved => "already synced this session",
        Resolution::KeptLocal => "local copy is newer, pushed to remote",
        Resolution::TookRemote => "remote copy is newer, pulled to local",
    };
    match user {
        Some(u) => println!("{} ({})", message, u.display_name),
        None => println!("{}", message),
    }
    Ok(())
}
