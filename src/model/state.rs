use serde::{Deserialize, Serialize};

use super::lenient;
use super::project::Project;

/// The whole planner: ordered projects plus the selected one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerState {
    #[serde(default, deserialize_with = "lenient::projects")]
    pub projects: Vec<Project>,
    /// Selected project index, `None` when nothing is selected
    #[serde(rename = "activeIndex", default, with = "lenient::active_index")]
    pub active: Option<usize>,
}

impl PlannerState {
    pub fn new(projects: Vec<Project>, active: Option<usize>) -> Self {
        let mut state = PlannerState { projects, active };
        state.normalize();
        state
    }

    /// Drop a selection that does not point at a live project.
    pub fn normalize(&mut self) {
        if self.active.is_some_and(|i| i >= self.projects.len()) {
            self.active = None;
        }
    }

    pub fn active_project(&self) -> Option<&Project> {
        self.active.and_then(|i| self.projects.get(i))
    }
}

/// A timestamped copy of the planner state, as held by one replica
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub state: PlannerState,
    /// Milliseconds since the Unix epoch; `0` when never written
    pub updated_at: i64,
}

impl Snapshot {
    pub fn new(state: PlannerState, updated_at: i64) -> Self {
        Snapshot { state, updated_at }
    }
}

/// The remote document as read back from the cloud store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSnapshot {
    #[serde(default, deserialize_with = "lenient::projects")]
    pub projects: Vec<Project>,
    #[serde(rename = "activeIndex", default, with = "lenient::active_index")]
    pub active: Option<usize>,
    /// Server-assigned write time; `None` while unresolved
    #[serde(default, deserialize_with = "lenient::timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}
