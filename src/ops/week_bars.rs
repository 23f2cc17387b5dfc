//! Projection of task date ranges onto the seven columns of one week.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::model::palette::PALETTE;
use crate::model::project::Project;
use crate::util::dates::{clamp, days_diff, end_of_week, start_of_week};

/// A task's date range clipped to the visible week
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekBar {
    pub project_index: usize,
    /// Task title, or the project name when the task has none
    pub title: String,
    /// First column, 0 = Monday
    pub start_col: u8,
    /// Last column (inclusive), 6 = Sunday
    pub end_col: u8,
    /// Palette slot of the owning project
    pub color_idx: usize,
}

/// Build the bars for the week containing `anchor`, ordered by project
/// index then task index.
///
/// A task with only one date is a single-day event on that date; a task
/// with no parseable date gets no bar.
pub fn build_week_bars(projects: &[Project], anchor: NaiveDateTime) -> Vec<WeekBar> {
    let week_start = start_of_week(anchor);
    let week_end = end_of_week(anchor);

    let mut bars = Vec::new();
    for (project_index, project) in projects.iter().enumerate() {
        let color_idx = project.color_idx.unwrap_or(project_index) % PALETTE.len();
        for task in &project.tasks {
            let (range_start, range_end) = match (task.start_date(), task.end_date()) {
                (Some(s), Some(e)) => (s, e),
                (Some(d), None) | (None, Some(d)) => (d, d),
                (None, None) => continue,
            };
            if range_end < week_start || range_start > week_end {
                continue;
            }

            let clip_start = range_start.max(week_start);
            let clip_end = range_end.min(week_end);
            let start_col = clamp(days_diff(week_start, clip_start), 0, 6) as u8;
            let end_col = clamp(days_diff(week_start, clip_end), 0, 6) as u8;

            let title = if task.title.is_empty() {
                project.name.clone()
            } else {
                task.title.clone()
            };
            bars.push(WeekBar {
                project_index,
                title,
                start_col,
                end_col,
                color_idx,
            });
        }
    }
    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{NewTask, Task};
    use crate::util::dates::parse_date_input;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn monday() -> NaiveDateTime {
        // 2025-08-18 is a Monday
        NaiveDate::from_ymd_opt(2025, 8, 18)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn task(title: &str, start: &str, end: &str) -> Task {
        Task::new(NewTask {
            title: title.into(),
            start: start.into(),
            end: end.into(),
            ..Default::default()
        })
    }

    fn project(name: &str, color: usize, tasks: Vec<Task>) -> Project {
        let mut p = Project::new(name.into(), color);
        p.tasks = tasks;
        p
    }

    #[test]
    fn range_spilling_past_sunday_is_clipped() {
        let projects = vec![project("P1", 0, vec![task("T1", "2025-08-22", "2025-08-27")])];
        let anchor = monday();
        let bars = build_week_bars(&projects, anchor);

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].title, "T1");
        let ws = start_of_week(anchor);
        assert_eq!(
            i64::from(bars[0].start_col),
            days_diff(ws, parse_date_input("2025-08-22").unwrap())
        );
        assert_eq!(bars[0].start_col, 4);
        assert_eq!(bars[0].end_col, 6);
    }

    #[test]
    fn task_in_prior_week_has_no_bar() {
        let projects = vec![project("P1", 0, vec![task("Old", "2025-08-11", "2025-08-17")])];
        assert!(build_week_bars(&projects, monday()).is_empty());
    }

    #[test]
    fn task_after_week_has_no_bar() {
        let projects = vec![project("P1", 0, vec![task("Later", "2025-08-25", "")])];
        assert!(build_week_bars(&projects, monday()).is_empty());
    }

    #[test]
    fn range_covering_whole_week() {
        let projects = vec![project("P1", 0, vec![task("Long", "2025-07-01", "2025-09-30")])];
        let bars = build_week_bars(&projects, monday());
        assert_eq!((bars[0].start_col, bars[0].end_col), (0, 6));
    }

    #[test]
    fn single_sided_dates_are_single_day_events() {
        let projects = vec![project(
            "P1",
            0,
            vec![task("Start only", "2025-08-19", ""), task("End only", "", "2025-08-24")],
        )];
        let bars = build_week_bars(&projects, monday());
        assert_eq!((bars[0].start_col, bars[0].end_col), (1, 1));
        assert_eq!((bars[1].start_col, bars[1].end_col), (6, 6));
    }

    #[test]
    fn undated_and_malformed_tasks_are_skipped() {
        let projects = vec![project(
            "P1",
            0,
            vec![task("None", "", ""), task("Bad", "soon", "later")],
        )];
        assert!(build_week_bars(&projects, monday()).is_empty());
    }

    #[test]
    fn empty_title_falls_back_to_project_name() {
        let projects = vec![project("Comics", 0, vec![task("", "2025-08-20", "2025-08-20")])];
        assert_eq!(build_week_bars(&projects, monday())[0].title, "Comics");
    }

    #[test]
    fn ordered_by_project_then_task_with_stable_colors() {
        let projects = vec![
            project("A", 5, vec![task("a1", "2025-08-21", ""), task("a2", "2025-08-18", "")]),
            project("B", 2, vec![task("b1", "2025-08-19", "")]),
        ];
        let bars = build_week_bars(&projects, monday());
        let order: Vec<_> = bars.iter().map(|b| (b.project_index, b.title.as_str())).collect();
        assert_eq!(order, vec![(0, "a1"), (0, "a2"), (1, "b1")]);
        assert_eq!(bars[0].color_idx, 5);
        assert_eq!(bars[2].color_idx, 2);
    }

    #[test]
    fn missing_color_falls_back_to_position() {
        let mut p = project("X", 0, vec![task("x", "2025-08-18", "")]);
        p.color_idx = None;
        let projects = vec![project("W", 0, vec![]), p];
        assert_eq!(build_week_bars(&projects, monday())[0].color_idx, 1);
    }

    #[test]
    fn anchor_mid_week_and_sunday_give_same_week() {
        let projects = vec![project("P1", 0, vec![task("T1", "2025-08-22", "2025-08-27")])];
        let wednesday = monday() + chrono::TimeDelta::days(2);
        let sunday = monday() + chrono::TimeDelta::hours(6 * 24 + 20);
        assert_eq!(
            build_week_bars(&projects, wednesday),
            build_week_bars(&projects, sunday)
        );
    }

    #[test]
    fn projection_is_pure() {
        let projects = vec![project("P1", 0, vec![task("T1", "2025-08-22", "2025-08-27")])];
        let before = projects.clone();
        let a = build_week_bars(&projects, monday());
        let b = build_week_bars(&projects, monday());
        assert_eq!(a, b);
        assert_eq!(projects, before);
    }
}
