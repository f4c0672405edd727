//! Task operations.

use crate::db::{DataService, Storage};
use crate::errors::AppError;
use crate::models::{CreateTaskRequest, Task, TaskFilter, UpdateTaskRequest, User};
use crate::reports::filter_tasks;

fn validate_text(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Employees may only touch their own tasks; admins may touch any.
fn ensure_can_edit(actor: &User, task: &Task) -> Result<(), AppError> {
    if actor.is_admin() || task.is_assigned_to(&actor.id) {
        Ok(())
    } else {
        Err(AppError::Unauthorized(
            "You can only modify tasks assigned to you".to_string(),
        ))
    }
}

/// Create a task. An employee's task is always assigned to themself.
pub async fn create_task<S: Storage>(
    store: &DataService<S>,
    actor: &User,
    request: &CreateTaskRequest,
) -> Result<Task, AppError> {
    validate_text(&request.title, "Task title")?;
    validate_text(&request.description, "Description")?;

    let mut request = request.clone();
    if !actor.is_admin() {
        request.assigned_to = actor.id.clone();
    }
    validate_text(&request.assigned_to, "Assignee")?;

    let task = store.create_task(&request, &actor.id).await?;
    tracing::info!("Task {} created by {}", task.id, actor.id);
    Ok(task)
}

/// Apply changes to a task. `Ok(None)` if the task does not exist.
pub async fn update_task<S: Storage>(
    store: &DataService<S>,
    actor: &User,
    id: &str,
    request: &UpdateTaskRequest,
) -> Result<Option<Task>, AppError> {
    let Some(existing) = store.get_task(id).await? else {
        return Ok(None);
    };
    ensure_can_edit(actor, &existing)?;

    if let Some(title) = &request.title {
        validate_text(title, "Task title")?;
    }

    let mut request = request.clone();
    if !actor.is_admin() {
        // Employees cannot hand their tasks to someone else.
        request.assigned_to = None;
    }

    store.apply_task_changes(id, &request).await
}

/// Delete a task. Deleting a missing task is a no-op that returns `false`.
pub async fn delete_task<S: Storage>(
    store: &DataService<S>,
    actor: &User,
    id: &str,
) -> Result<bool, AppError> {
    let Some(existing) = store.get_task(id).await? else {
        return Ok(false);
    };
    ensure_can_edit(actor, &existing)?;

    store.delete_task(id).await
}

/// The actor's role-scoped task list narrowed by `filter`.
pub async fn list_tasks<S: Storage>(
    store: &DataService<S>,
    actor: &User,
    filter: &TaskFilter,
) -> Result<Vec<Task>, AppError> {
    let tasks = store.list_tasks().await?;
    Ok(filter_tasks(&tasks, actor, filter)
        .into_iter()
        .cloned()
        .collect())
}
