use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::lenient;
use crate::util::dates::parse_date_input;

/// A task inside a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque id, assigned at creation and never changed
    #[serde(default = "lenient::new_id", deserialize_with = "lenient::id")]
    pub id: String,
    /// Task title (may be empty; the calendar falls back to the project name)
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    /// Free-form description
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    /// Start date as `YYYY-MM-DD`, or empty
    #[serde(default, deserialize_with = "lenient::string")]
    pub start: String,
    /// End date as `YYYY-MM-DD`, or empty
    #[serde(default, deserialize_with = "lenient::string")]
    pub end: String,
    /// Completion percentage, `0..=100`
    #[serde(default, deserialize_with = "lenient::progress")]
    pub progress: u8,
}

/// Fields for a task that has not been created yet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub start: String,
    pub end: String,
    pub progress: i64,
}

/// A single field-level edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskField {
    Title(String),
    Description(String),
    Start(String),
    End(String),
    Progress(i64),
}

impl TaskField {
    /// Build a field edit from a field name and raw value (as typed on the CLI).
    pub fn parse(key: &str, value: &str) -> Option<TaskField> {
        match key {
            "title" => Some(TaskField::Title(value.to_string())),
            "description" | "desc" => Some(TaskField::Description(value.to_string())),
            "start" => Some(TaskField::Start(value.to_string())),
            "end" => Some(TaskField::End(value.to_string())),
            "progress" => value.trim().parse().ok().map(TaskField::Progress),
            _ => None,
        }
    }
}

impl Task {
    /// Create a task from a draft with a fresh id. Progress is clamped.
    pub fn new(draft: NewTask) -> Self {
        Task {
            id: lenient::new_id(),
            title: draft.title,
            description: draft.description,
            start: draft.start,
            end: draft.end,
            progress: clamp_progress(draft.progress),
        }
    }

    /// Apply one field edit in place.
    pub fn apply(&mut self, field: TaskField) {
        match field {
            TaskField::Title(v) => self.title = v,
            TaskField::Description(v) => self.description = v,
            TaskField::Start(v) => self.start = v,
            TaskField::End(v) => self.end = v,
            TaskField::Progress(p) => self.progress = clamp_progress(p),
        }
    }

    pub fn start_date(&self) -> Option<NaiveDateTime> {
        parse_date_input(&self.start)
    }

    pub fn end_date(&self) -> Option<NaiveDateTime> {
        parse_date_input(&self.end)
    }
}

fn clamp_progress(p: i64) -> u8 {
    p.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_clamps_progress_and_assigns_id() {
        let t = Task::new(NewTask {
            title: "Sketch".into(),
            progress: 140,
            ..Default::default()
        });
        assert_eq!(t.progress, 100);
        assert!(!t.id.is_empty());
        let other = Task::new(NewTask::default());
        assert_ne!(t.id, other.id);
    }

    #[test]
    fn apply_edits_single_field() {
        let mut t = Task::new(NewTask::default());
        let id = t.id.clone();
        t.apply(TaskField::Title("Ink".into()));
        t.apply(TaskField::Start("2025-08-22".into()));
        t.apply(TaskField::Progress(-4));
        assert_eq!(t.title, "Ink");
        assert_eq!(t.start, "2025-08-22");
        assert_eq!(t.progress, 0);
        assert_eq!(t.id, id);
        assert!(t.start_date().is_some());
        assert!(t.end_date().is_none());
    }

    #[test]
    fn parse_field_names() {
        assert_eq!(TaskField::parse("progress", " 40 "), Some(TaskField::Progress(40)));
        assert_eq!(TaskField::parse("desc", "x"), Some(TaskField::Description("x".into())));
        assert_eq!(TaskField::parse("progress", "lots"), None);
        assert_eq!(TaskField::parse("color", "red"), None);
    }

    #[test]
    fn decode_tolerates_wrong_shapes() {
        let t: Task = serde_json::from_str(
            r#"{"title": 5, "start": null, "end": "2025-08-27", "progress": "60"}"#,
        )
        .unwrap();
        assert_eq!(t.title, "");
        assert_eq!(t.start, "");
        assert_eq!(t.end, "2025-08-27");
        assert_eq!(t.progress, 60);
        assert!(!t.id.is_empty());
    }

    #[test]
    fn serializes_flat_shape() {
        let mut t = Task::new(NewTask {
            title: "T1".into(),
            ..Default::default()
        });
        t.id = "t-1".into();
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "id": "t-1", "title": "T1", "description": "",
                "start": "", "end": "", "progress": 0
            })
        );
    }
}
