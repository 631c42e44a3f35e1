/// Task endpoints
///
/// - `POST   /v1/tasks` creates a task on a board
/// - `GET    /v1/tasks/assigned-to-me`
/// - `GET    /v1/tasks/reviewing`
/// - `GET    /v1/tasks/:id`
/// - `PATCH  /v1/tasks/:id`
/// - `DELETE /v1/tasks/:id`
///
/// Assignee and reviewer must be members of the task's board. Those checks
/// run after the permission check, inside the gated mutation, so nothing is
/// written when either fails.
///
/// # Response
///
/// ```json
/// {
///   "id": "uuid",
///   "board": "uuid",
///   "title": "Write release notes",
///   "description": null,
///   "status": "to-do",
///   "priority": "medium",
///   "assignee": { "id": "uuid", "email": "ada@example.com", "fullname": "Ada Lovelace" },
///   "reviewer": null,
///   "due_date": "2025-03-01",
///   "comments_count": 0
/// }
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{loaded, trimmed, trimmed_opt},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use kanban_shared::{
    auth::{
        authorization::authorize_and_execute,
        middleware::AuthContext,
        policy::{Operation, ReadScope},
        relations::{check_board_relation, RelationField},
        scope::{ResourceKind, ResourceRef, Scope},
    },
    models::{
        task::{CreateTask, Task, TaskPriority, TaskStatus, TaskView, UpdateTask},
        user::UserSummary,
    },
};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    pub board: Uuid,

    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,

    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub priority: TaskPriority,

    pub assignee_id: Option<Uuid>,
    pub reviewer_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
}

/// Partial update
///
/// A missing field is left alone. An explicit `null` clears a nullable field.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,

    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,

    #[serde(default, deserialize_with = "present")]
    pub assignee_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "present")]
    pub reviewer_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<NaiveDate>>,
}

/// Marks a field as present, keeping `null` distinct from absent
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: Uuid,
    pub board: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee: Option<UserSummary>,
    pub reviewer: Option<UserSummary>,
    pub due_date: Option<NaiveDate>,
    pub comments_count: i64,
}

impl From<TaskView> for TaskResponse {
    fn from(view: TaskView) -> Self {
        let assignee = view.assignee();
        let reviewer = view.reviewer();

        Self {
            id: view.id,
            board: view.board_id,
            title: view.title,
            description: view.description,
            status: view.status,
            priority: view.priority,
            assignee,
            reviewer,
            due_date: view.due_date,
            comments_count: view.comments_count,
        }
    }
}

async fn task_response(db: &sqlx::PgPool, id: Uuid) -> ApiResult<TaskResponse> {
    TaskView::find_by_id(db, id)
        .await?
        .map(TaskResponse::from)
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
}

/// Creates a task on the board named in the body
///
/// # Errors
///
/// - `400 Bad Request`: invalid fields, or assignee/reviewer not on the board
/// - `403 Forbidden`: caller is not a member of the board
/// - `404 Not Found`: board does not exist
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    req.validate()?;

    let db = &state.db;
    let user_id = auth.user_id;

    let task = authorize_and_execute(
        db,
        &auth.actor(),
        Operation::Create,
        ResourceKind::Task,
        Some(ResourceRef::Board(req.board)),
        move |scope| async move {
            let board = loaded(scope.and_then(Scope::into_board))?;
            check_board_relation(&board, req.assignee_id, RelationField::Assignee)?;
            check_board_relation(&board, req.reviewer_id, RelationField::Reviewer)?;

            let task = Task::create(
                db,
                CreateTask {
                    board_id: board.id,
                    title: req.title,
                    description: req.description,
                    status: req.status,
                    priority: req.priority,
                    due_date: req.due_date,
                    assignee_id: req.assignee_id,
                    reviewer_id: req.reviewer_id,
                    created_by: user_id,
                },
            )
            .await?;

            Ok::<_, ApiError>(task)
        },
    )
    .await?;

    tracing::info!(
        user_id = %user_id,
        board_id = %task.board_id,
        task_id = %task.id,
        status = task.status.as_str(),
        priority = task.priority.as_str(),
        "Task created"
    );

    Ok((StatusCode::CREATED, Json(task_response(db, task.id).await?)))
}

/// Tasks on any board where the caller is the assignee
///
/// Not routed through the access gate: the SQL filter on `assignee_id` is
/// the `ReadScope::AssignedToMe` rule, so every returned row would be allowed.
pub async fn assigned_to_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = TaskView::list_assigned_to(&state.db, auth.user_id).await?;

    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// Tasks on any board where the caller is the reviewer
///
/// Not routed through the access gate: the SQL filter on `reviewer_id` is
/// the `ReadScope::Reviewing` rule.
pub async fn reviewing(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = TaskView::list_reviewed_by(&state.db, auth.user_id).await?;

    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let db = &state.db;

    let task = authorize_and_execute(
        db,
        &auth.actor(),
        Operation::Read(ReadScope::Detail),
        ResourceKind::Task,
        Some(ResourceRef::Task(task_id)),
        move |_scope| task_response(db, task_id),
    )
    .await?;

    Ok(Json(task))
}

/// Applies a partial update
///
/// # Errors
///
/// - `400 Bad Request`: invalid fields, or a new assignee/reviewer who is
///   not on the board
/// - `403 Forbidden`: caller is not a member of the task's board
/// - `404 Not Found`: task does not exist
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    req.validate()?;

    let db = &state.db;

    let task = authorize_and_execute(
        db,
        &auth.actor(),
        Operation::Update,
        ResourceKind::Task,
        Some(ResourceRef::Task(task_id)),
        move |scope| async move {
            let task = loaded(scope.and_then(Scope::into_task))?;

            if let Some(assignee_id) = req.assignee_id {
                check_board_relation(&task.board, assignee_id, RelationField::Assignee)?;
            }
            if let Some(reviewer_id) = req.reviewer_id {
                check_board_relation(&task.board, reviewer_id, RelationField::Reviewer)?;
            }

            Task::update(
                db,
                task.id,
                UpdateTask {
                    title: req.title,
                    description: req.description,
                    status: req.status,
                    priority: req.priority,
                    due_date: req.due_date,
                    assignee_id: req.assignee_id,
                    reviewer_id: req.reviewer_id,
                },
            )
            .await?
            .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
        },
    )
    .await?;

    tracing::info!(
        user_id = %auth.user_id,
        task_id = %task_id,
        status = task.status.as_str(),
        priority = task.priority.as_str(),
        "Task updated"
    );

    Ok(Json(task_response(db, task_id).await?))
}

/// Deletes a task. Allowed for its creator and the board owner.
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let db = &state.db;

    authorize_and_execute(
        db,
        &auth.actor(),
        Operation::Delete,
        ResourceKind::Task,
        Some(ResourceRef::Task(task_id)),
        move |_scope| async move { Ok::<_, ApiError>(Task::delete(db, task_id).await?) },
    )
    .await?;

    tracing::info!(user_id = %auth.user_id, task_id = %task_id, "Task deleted");

    Ok(StatusCode::NO_CONTENT)
}
