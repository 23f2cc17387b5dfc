use crate::model::palette::PALETTE;
use crate::model::project::Project;
use crate::model::state::PlannerState;
use crate::ops::reorder::{after_append, after_delete, after_move, reorder, selection_valid};

/// Error type for project operations
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("project not found at index {0}")]
    NotFound(usize),
    #[error("project name cannot be empty")]
    EmptyName,
    #[error("project emoji cannot be empty")]
    EmptyEmoji,
}

// ---------------------------------------------------------------------------
// Create / edit
// ---------------------------------------------------------------------------

/// Append a new project. Its palette slot is the project count at creation
/// time, so the colour survives later reorders. Returns the new index.
pub fn add_project(state: &mut PlannerState, name: &str) -> Result<usize, ProjectError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ProjectError::EmptyName);
    }
    let old_len = state.projects.len();
    let color_idx = old_len % PALETTE.len();
    state.projects.push(Project::new(name.to_string(), color_idx));
    state.active = after_append(state.active, old_len);
    debug_assert!(selection_valid(state.active, state.projects.len()));
    Ok(old_len)
}

pub fn rename_project(state: &mut PlannerState, index: usize, name: &str) -> Result<(), ProjectError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ProjectError::EmptyName);
    }
    project_mut(state, index)?.name = name.to_string();
    Ok(())
}

pub fn set_emoji(state: &mut PlannerState, index: usize, emoji: &str) -> Result<(), ProjectError> {
    let emoji = emoji.trim();
    if emoji.is_empty() {
        return Err(ProjectError::EmptyEmoji);
    }
    project_mut(state, index)?.emoji = emoji.to_string();
    Ok(())
}

// ---------------------------------------------------------------------------
// Structural changes (each repairs the selection)
// ---------------------------------------------------------------------------

/// Remove the project at `index`, returning it.
pub fn delete_project(state: &mut PlannerState, index: usize) -> Result<Project, ProjectError> {
    if index >= state.projects.len() {
        return Err(ProjectError::NotFound(index));
    }
    let removed = state.projects.remove(index);
    state.active = after_delete(state.active, index, state.projects.len());
    debug_assert!(selection_valid(state.active, state.projects.len()));
    Ok(removed)
}

/// Move a project. Out-of-range or same-index moves change nothing and
/// return `false`.
pub fn move_project(state: &mut PlannerState, from: usize, to: usize) -> bool {
    if !reorder(&mut state.projects, from, to) {
        return false;
    }
    state.active = after_move(state.active, from, to);
    debug_assert!(selection_valid(state.active, state.projects.len()));
    true
}

/// Select a project, or clear the selection with `None`.
pub fn select_project(state: &mut PlannerState, index: Option<usize>) -> Result<(), ProjectError> {
    if let Some(i) = index {
        if i >= state.projects.len() {
            return Err(ProjectError::NotFound(i));
        }
    }
    state.active = index;
    Ok(())
}

/// Replace every project at once (import). Selects the first project, if any.
pub fn replace_projects(state: &mut PlannerState, mut projects: Vec<Project>) {
    for (i, p) in projects.iter_mut().enumerate() {
        if p.color_idx.is_none() {
            p.color_idx = Some(i % PALETTE.len());
        }
    }
    state.active = if projects.is_empty() { None } else { Some(0) };
    state.projects = projects;
}

pub fn project_mut(state: &mut PlannerState, index: usize) -> Result<&mut Project, ProjectError> {
    state
        .projects
        .get_mut(index)
        .ok_or(ProjectError::NotFound(index))
}
