//! User administration. Admin only.

use serde::Serialize;

use crate::auth::require_admin;
use crate::db::{DataService, Storage};
use crate::errors::AppError;
use crate::models::{CreateUserRequest, UpdateUserRequest, User};
use crate::reports::{filter_users, TaskProgress, UserFilter};

/// A row of the employee directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub user: User,
    pub progress: TaskProgress,
}

pub async fn create_user<S: Storage>(
    store: &DataService<S>,
    actor: &User,
    request: &CreateUserRequest,
) -> Result<User, AppError> {
    require_admin(actor)?;

    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if request.email.trim().is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }

    let user = store.create_user(request).await?;
    tracing::info!("User {} created by {}", user.id, actor.id);
    Ok(user)
}

/// Apply changes to a user. `Ok(None)` if the user does not exist.
pub async fn update_user<S: Storage>(
    store: &DataService<S>,
    actor: &User,
    id: &str,
    request: &UpdateUserRequest,
) -> Result<Option<User>, AppError> {
    require_admin(actor)?;

    if request.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Validation("Name is required".to_string()));
    }

    store.apply_user_changes(id, request).await
}

/// Delete a user. Their tasks stay behind with a dangling assignee.
pub async fn delete_user<S: Storage>(
    store: &DataService<S>,
    actor: &User,
    id: &str,
) -> Result<bool, AppError> {
    require_admin(actor)?;

    if actor.id == id {
        return Err(AppError::Validation(
            "You cannot delete your own account".to_string(),
        ));
    }

    store.delete_user(id).await
}

/// Users matching `filter`, each with their task progress.
pub async fn employee_directory<S: Storage>(
    store: &DataService<S>,
    actor: &User,
    filter: &UserFilter,
) -> Result<Vec<DirectoryEntry>, AppError> {
    require_admin(actor)?;

    let users = store.list_users().await?;
    let tasks = store.list_tasks().await?;

    Ok(filter_users(&users, filter)
        .into_iter()
        .map(|user| DirectoryEntry {
            user: user.clone(),
            progress: TaskProgress::for_user(&tasks, &user.id),
        })
        .collect())
}
