//! Task comments.

use crate::db::{DataService, Storage};
use crate::errors::AppError;
use crate::models::{Comment, CreateCommentRequest, User};

/// Add a comment by `actor`. The task id is not checked; comments on a deleted task are kept.
pub async fn add_comment<S: Storage>(
    store: &DataService<S>,
    actor: &User,
    request: &CreateCommentRequest,
) -> Result<Comment, AppError> {
    if request.content.trim().is_empty() {
        return Err(AppError::Validation("Comment cannot be empty".to_string()));
    }

    store.create_comment(request, actor).await
}

pub async fn list_comments<S: Storage>(
    store: &DataService<S>,
    task_id: &str,
) -> Result<Vec<Comment>, AppError> {
    store.comments_for_task(task_id).await
}
