use chrono::NaiveDate;
use serde::Serialize;

use crate::model::palette::color_for;
use crate::model::project::Project;
use crate::model::task::Task;
use crate::ops::progress::average_progress;
use crate::ops::week_bars::WeekBar;
use crate::util::dates::format_date_input;
use crate::util::text::{display_width, fit_to_width};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ProjectJson {
    pub position: usize,
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub color: &'static str,
    pub active: bool,
    pub tasks: usize,
    pub progress: u8,
}

#[derive(Serialize)]
pub struct TaskJson {
    pub position: usize,
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub start: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub end: String,
    pub progress: u8,
}

#[derive(Serialize)]
pub struct TaskListJson {
    pub project: String,
    pub progress: u8,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct WeekJson {
    pub start: String,
    pub end: String,
    pub days: Vec<String>,
    pub bars: Vec<WeekBarJson>,
}

#[derive(Serialize)]
pub struct WeekBarJson {
    pub project: String,
    #[serde(flatten)]
    pub bar: WeekBar,
    pub color: &'static str,
    pub background: &'static str,
    pub border: &'static str,
}

#[derive(Serialize)]
pub struct ProgressJson {
    pub project: String,
    pub progress: u8,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn project_to_json(position: usize, project: &Project, active: bool) -> ProjectJson {
    ProjectJson {
        position: position + 1,
        id: project.id.clone(),
        name: project.name.clone(),
        emoji: project.emoji.clone(),
        color: color_for(project.color_idx.unwrap_or(position)).name,
        active,
        tasks: project.tasks.len(),
        progress: average_progress(&project.tasks),
    }
}

pub fn task_to_json(position: usize, task: &Task) -> TaskJson {
    TaskJson {
        position: position + 1,
        id: task.id.clone(),
        title: task.title.clone(),
        description: task.description.clone(),
        start: task.start.clone(),
        end: task.end.clone(),
        progress: task.progress,
    }
}

pub fn week_to_json(days: &[NaiveDate; 7], bars: Vec<WeekBar>, projects: &[Project]) -> WeekJson {
    WeekJson {
        start: format_date_input(days[0]),
        end: format_date_input(days[6]),
        days: days.iter().map(|d| format_date_input(*d)).collect(),
        bars: bars
            .into_iter()
            .map(|bar| {
                let color = color_for(bar.color_idx);
                WeekBarJson {
                    project: project_name(projects, bar.project_index).to_string(),
                    bar,
                    color: color.name,
                    background: color.bg,
                    border: color.border,
                }
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// `* 2. 📁 Name  (3 tasks, 40%)`, with `*` marking the selected project
pub fn format_project_line(position: usize, project: &Project, active: bool) -> String {
    let marker = if active { '*' } else { ' ' };
    let count = project.tasks.len();
    format!(
        "{} {}. {} {}  ({} task{}, {}%)",
        marker,
        position + 1,
        project.emoji,
        project.name,
        count,
        if count == 1 { "" } else { "s" },
        average_progress(&project.tasks)
    )
}

/// `1. Title  2024-03-04 -> 2024-03-08  50%`
pub fn format_task_line(position: usize, task: &Task) -> String {
    let dates = match (task.start.is_empty(), task.end.is_empty()) {
        (true, true) => String::new(),
        (false, true) => format!("  from {}", task.start),
        (true, false) => format!("  until {}", task.end),
        (false, false) => format!("  {} -> {}", task.start, task.end),
    };
    format!("{}. {}{}  {}%", position + 1, task.title, dates, task.progress)
}

fn project_name(projects: &[Project], index: usize) -> &str {
    projects.get(index).map(|p| p.name.as_str()).unwrap_or("")
}

const LABEL_MAX: usize = 16;

/// Render the week as a text grid: a header of day columns, then one row
/// per bar with the project name on the left.
pub fn format_week(days: &[NaiveDate; 7], bars: &[WeekBar], projects: &[Project], day_width: usize) -> Vec<String> {
    let day_width = day_width.max(4);
    let label_width = bars
        .iter()
        .map(|b| display_width(project_name(projects, b.project_index)))
        .max()
        .unwrap_or(0)
        .clamp(4, LABEL_MAX);

    let mut lines = Vec::new();
    lines.push(format!(
        "Week {} .. {}",
        format_date_input(days[0]),
        format_date_input(days[6])
    ));

    let mut header = " ".repeat(label_width + 1);
    for day in days {
        header.push_str(&fit_to_width(&day.format("%a %d").to_string(), day_width));
    }
    lines.push(header.trim_end().to_string());

    if bars.is_empty() {
        lines.push("(nothing scheduled)".to_string());
        return lines;
    }

    for bar in bars {
        let mut row = fit_to_width(project_name(projects, bar.project_index), label_width);
        row.push(' ');
        row.push_str(&" ".repeat(usize::from(bar.start_col) * day_width));
        let span = usize::from(bar.end_col.saturating_sub(bar.start_col) + 1) * day_width;
        row.push_str(&render_bar(&bar.title, span));
        lines.push(row.trim_end().to_string());
    }
    lines
}

/// `[title....]` filling `width` cells, leaving one cell of gap at the end
fn render_bar(title: &str, width: usize) -> String {
    if width < 3 {
        return "#".repeat(width);
    }
    format!("[{}] ", fit_to_width(title, width - 3))
}
