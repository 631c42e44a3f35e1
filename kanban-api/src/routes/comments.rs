/// Comment endpoints, nested under their task
///
/// - `GET    /v1/tasks/:id/comments`
/// - `POST   /v1/tasks/:id/comments`
/// - `DELETE /v1/tasks/:id/comments/:comment_id`
///
/// Board members may read and write comments. Only the author may delete
/// one, and comments cannot be edited.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use kanban_shared::{
    auth::{
        authorization::authorize_and_execute,
        middleware::AuthContext,
        policy::{Operation, ReadScope},
        relations::check_comment_content,
        scope::{ResourceKind, ResourceRef},
    },
    models::comment::{CommentView, CreateComment},
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct CreateCommentRequest {
    pub content: Option<String>,
}

pub async fn list_comments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentView>>> {
    let db = &state.db;

    let comments = authorize_and_execute(
        db,
        &auth.actor(),
        Operation::Read(ReadScope::List),
        ResourceKind::Comment,
        Some(ResourceRef::Task(task_id)),
        move |_scope| async move { Ok::<_, ApiError>(CommentView::list_by_task(db, task_id).await?) },
    )
    .await?;

    Ok(Json(comments))
}

/// Adds a comment as the caller
///
/// A missing or unparsable body is treated like empty content.
///
/// # Errors
///
/// - `400 Bad Request`: content missing or blank
/// - `403 Forbidden`: caller is not a member of the task's board
/// - `404 Not Found`: task does not exist
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    body: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CommentView>)> {
    let db = &state.db;
    let user_id = auth.user_id;
    let content = body.ok().and_then(|Json(req)| req.content);

    let comment = authorize_and_execute(
        db,
        &auth.actor(),
        Operation::Create,
        ResourceKind::Comment,
        Some(ResourceRef::Task(task_id)),
        move |_scope| async move {
            let content = check_comment_content(content.as_deref())?;

            let comment = CommentView::create(
                db,
                CreateComment {
                    task_id,
                    author_id: user_id,
                    content: content.to_string(),
                },
            )
            .await?;

            Ok::<_, ApiError>(comment)
        },
    )
    .await?;

    tracing::info!(user_id = %user_id, task_id = %task_id, comment_id = %comment.id, "Comment created");

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Deletes a comment. Only its author may, even the board owner cannot.
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((task_id, comment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let db = &state.db;

    authorize_and_execute(
        db,
        &auth.actor(),
        Operation::Delete,
        ResourceKind::Comment,
        Some(ResourceRef::Comment { task_id, comment_id }),
        move |_scope| async move { Ok::<_, ApiError>(CommentView::delete(db, comment_id).await?) },
    )
    .await?;

    tracing::info!(user_id = %auth.user_id, comment_id = %comment_id, "Comment deleted");

    Ok(StatusCode::NO_CONTENT)
}
