use crate::model::project::Project;
use crate::model::task::{NewTask, Task, TaskField};
use crate::ops::reorder::reorder;

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task not found at index {0}")]
    NotFound(usize),
    #[error("task title cannot be empty")]
    EmptyTitle,
}

/// Append a task to the project. Returns the new task's id.
pub fn add_task(project: &mut Project, mut draft: NewTask) -> Result<String, TaskError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(TaskError::EmptyTitle);
    }
    draft.title = title.to_string();
    let task = Task::new(draft);
    let id = task.id.clone();
    project.tasks.push(task);
    Ok(id)
}

/// Apply a single field edit to the task at `index`. A title edit is
/// trimmed and may not be blank.
pub fn update_task(project: &mut Project, index: usize, mut field: TaskField) -> Result<(), TaskError> {
    if let TaskField::Title(ref mut title) = field {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        *title = trimmed.to_string();
    }
    let task = project
        .tasks
        .get_mut(index)
        .ok_or(TaskError::NotFound(index))?;
    task.apply(field);
    Ok(())
}

pub fn delete_task(project: &mut Project, index: usize) -> Result<Task, TaskError> {
    if index >= project.tasks.len() {
        return Err(TaskError::NotFound(index));
    }
    Ok(project.tasks.remove(index))
}

/// Move a task within its project. Invalid indices are a silent no-op.
pub fn move_task(project: &mut Project, from: usize, to: usize) -> bool {
    reorder(&mut project.tasks, from, to)
}
