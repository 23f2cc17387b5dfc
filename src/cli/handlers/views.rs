use std::fs;

use chrono::Local;

use super::{CmdResult, Session, target_project};
use crate::cli::commands::{ExportArgs, ImportArgs, ProgressArgs, WeekArgs};
use crate::cli::output::*;
use crate::io::local_store::atomic_write;
use crate::ops::transfer::export_json;
use crate::util::dates::{parse_date_input, shift_weeks, week_days};

pub(super) fn cmd_week(session: &Session, args: WeekArgs) -> CmdResult {
    let anchor = match args.date {
        Some(ref text) => parse_date_input(text)
            .ok_or_else(|| format!("invalid date '{}' (expected YYYY-MM-DD)", text))?,
        None => Local::now().naive_local(),
    };
    let anchor = shift_weeks(anchor, args.offset);
    let days = week_days(anchor);
    let bars = session.store.week_bars(anchor);
    let projects = session.store.projects();

    if session.json {
        let out = week_to_json(&days, bars, projects);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in format_week(&days, &bars, projects, session.config.ui.day_width) {
            println!("{}", line);
        }
    }
    Ok(())
}

pub(super) fn cmd_progress(session: &Session, args: ProgressArgs) -> CmdResult {
    let index = target_project(session, args.position)?;
    let progress = session.store.average_progress(index)?;
    let name = &session.store.projects()[index].name;
    if session.json {
        let out = ProgressJson {
            project: name.clone(),
            progress,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}: {}%", name, progress);
    }
    Ok(())
}

pub(super) fn cmd_export(session: &Session, args: ExportArgs) -> CmdResult {
    let doc = session.store.export(args.note);
    let text = export_json(&doc)?;
    match args.out {
        Some(path) => {
            atomic_write(&path, format!("{}\n", text).as_bytes())
                .map_err(|e| format!("could not write {}: {}", path.display(), e))?;
            if !session.json {
                println!("exported {} projects to {}", doc.projects.len(), path.display());
            }
        }
        None => println!("{}", text),
    }
    Ok(())
}

pub(super) fn cmd_import(session: &mut Session, args: ImportArgs) -> CmdResult {
    let text = fs::read_to_string(&args.file)
        .map_err(|e| format!("could not read {}: {}", args.file.display(), e))?;
    let count = session.store.import(&text)?;
    if session.json {
        println!("{}", serde_json::json!({ "imported": count }));
    } else {
        println!("imported {} projects", count);
    }
    Ok(())
}
