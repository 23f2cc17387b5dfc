//! Export to and import from a standalone JSON document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::lenient;
use crate::model::project::Project;
use crate::model::state::PlannerState;
use crate::model::task::Task;

/// Name given to the wrapper project when a bare task list is imported
pub const IMPORTED_PROJECT_NAME: &str = "Imported";

/// Error type for import operations
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("import file is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// The downloadable document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub projects: Vec<Project>,
    #[serde(rename = "activeIndex", with = "lenient::active_index")]
    pub active: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub exported_at: DateTime<Utc>,
}

/// What an import produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imported {
    pub projects: Vec<Project>,
    pub note: Option<String>,
}

pub fn export_state(state: &PlannerState, note: Option<String>, now: DateTime<Utc>) -> ExportDocument {
    ExportDocument {
        projects: state.projects.clone(),
        active: state.active,
        note,
        exported_at: now,
    }
}

pub fn export_json(doc: &ExportDocument) -> Result<String, TransferError> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Read an exported (or hand-written) document.
///
/// Only unparseable JSON is an error. A `projects` value of the wrong shape
/// becomes an empty list; a top-level `tasks` array with no `projects` key
/// is wrapped in a single project.
pub fn import_json(text: &str) -> Result<Imported, TransferError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(mut doc) = value else {
        return Ok(Imported {
            projects: Vec::new(),
            note: None,
        });
    };

    let note = match doc.remove("note") {
        Some(Value::String(s)) => Some(s),
        _ => None,
    };

    let projects = match (doc.remove("projects"), doc.remove("tasks")) {
        (Some(projects), _) => lenient::objects::<Project>(projects),
        (None, Some(tasks)) => {
            let tasks: Vec<Task> = lenient::objects(tasks);
            let mut wrapper = Project::new(IMPORTED_PROJECT_NAME.to_string(), 0);
            wrapper.tasks = tasks;
            vec![wrapper]
        }
        (None, None) => Vec::new(),
    };

    Ok(Imported { projects, note })
}
