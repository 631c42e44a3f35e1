/// Board endpoints
///
/// - `GET    /v1/boards` boards the caller owns or is a member of
/// - `POST   /v1/boards` creates a board owned by the caller
/// - `GET    /v1/boards/:id` board with members and tasks
/// - `PATCH  /v1/boards/:id` renames and/or replaces the member set
/// - `DELETE /v1/boards/:id` owner only; tasks and comments go with it

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{loaded, tasks::TaskResponse, trimmed, trimmed_opt},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use kanban_shared::{
    auth::{
        authorization::authorize_and_execute,
        middleware::AuthContext,
        policy::{Operation, ReadScope},
        scope::{ResourceKind, ResourceRef, Scope},
    },
    models::{
        board::{Board, BoardListItem, CreateBoard, UpdateBoard},
        task::TaskView,
        user::{User, UserSummary},
    },
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,

    #[serde(default)]
    pub members: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBoardRequest {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: Option<String>,

    /// Replaces the member set when present
    pub members: Option<Vec<Uuid>>,
}

#[derive(Debug, Serialize)]
pub struct BoardDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub owner_id: Uuid,
    pub members: Vec<UserSummary>,
    pub tasks: Vec<TaskResponse>,
}

#[derive(Debug, Serialize)]
pub struct BoardUpdateResponse {
    pub id: Uuid,
    pub title: String,
    pub owner_data: Option<UserSummary>,
    pub members_data: Vec<UserSummary>,
}

/// Rejects member lists naming users that do not exist
async fn ensure_users_exist(db: &PgPool, members: &[Uuid]) -> ApiResult<()> {
    let missing = User::find_missing(db, members).await?;

    if missing.is_empty() {
        return Ok(());
    }

    let ids: Vec<String> = missing.iter().map(Uuid::to_string).collect();
    Err(ApiError::field(
        "members",
        format!("Unknown users: {}", ids.join(", ")),
    ))
}

/// Boards the caller owns or is a member of
///
/// The SQL filter is the `ReadScope::List` rule for boards, so rows are not
/// passed through the access gate one by one.
pub async fn list_boards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<BoardListItem>>> {
    let boards = Board::list_for_user(&state.db, auth.user_id).await?;

    Ok(Json(boards))
}

/// Creates a board owned by the caller
///
/// # Errors
///
/// - `400 Bad Request`: invalid title or unknown member ids
pub async fn create_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateBoardRequest>,
) -> ApiResult<(StatusCode, Json<BoardListItem>)> {
    req.validate()?;

    let db = &state.db;
    let user_id = auth.user_id;

    let board = authorize_and_execute(
        db,
        &auth.actor(),
        Operation::Create,
        ResourceKind::Board,
        None,
        move |_scope| async move {
            ensure_users_exist(db, &req.members).await?;

            let board = Board::create(
                db,
                CreateBoard {
                    title: req.title,
                    owner_id: user_id,
                    members: req.members,
                },
            )
            .await?;

            Ok::<_, ApiError>(board)
        },
    )
    .await?;

    tracing::info!(user_id = %user_id, board_id = %board.id, "Board created");

    let item = Board::find_list_item(db, board.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;

    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn get_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<BoardDetailResponse>> {
    let db = &state.db;

    let detail = authorize_and_execute(
        db,
        &auth.actor(),
        Operation::Read(ReadScope::Detail),
        ResourceKind::Board,
        Some(ResourceRef::Board(board_id)),
        move |scope| async move {
            let board = loaded(scope.and_then(Scope::into_board))?;

            let title = Board::find_by_id(db, board.id)
                .await?
                .map(|b| b.title)
                .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;
            let members = Board::members(db, board.id).await?;
            let tasks = TaskView::list_by_board(db, board.id).await?;

            Ok::<_, ApiError>(BoardDetailResponse {
                id: board.id,
                title,
                owner_id: board.owner_id,
                members,
                tasks: tasks.into_iter().map(TaskResponse::from).collect(),
            })
        },
    )
    .await?;

    Ok(Json(detail))
}

/// Renames a board and/or replaces its members
///
/// Owner and members may both update.
///
/// # Errors
///
/// - `400 Bad Request`: invalid title or unknown member ids
/// - `403 Forbidden`: caller is neither owner nor member
/// - `404 Not Found`: board does not exist
pub async fn update_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
    Json(req): Json<UpdateBoardRequest>,
) -> ApiResult<Json<BoardUpdateResponse>> {
    req.validate()?;

    let db = &state.db;

    let board = authorize_and_execute(
        db,
        &auth.actor(),
        Operation::Update,
        ResourceKind::Board,
        Some(ResourceRef::Board(board_id)),
        move |_scope| async move {
            if let Some(members) = &req.members {
                ensure_users_exist(db, members).await?;
            }

            Board::update(
                db,
                board_id,
                UpdateBoard {
                    title: req.title,
                    members: req.members,
                },
            )
            .await?
            .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))
        },
    )
    .await?;

    tracing::info!(user_id = %auth.user_id, board_id = %board.id, "Board updated");

    let owner_data = User::find_by_id(db, board.owner_id)
        .await?
        .as_ref()
        .map(UserSummary::from);
    let members_data = Board::members(db, board.id).await?;

    Ok(Json(BoardUpdateResponse {
        id: board.id,
        title: board.title,
        owner_data,
        members_data,
    }))
}

/// Deletes a board. Only the owner may.
pub async fn delete_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let db = &state.db;

    authorize_and_execute(
        db,
        &auth.actor(),
        Operation::Delete,
        ResourceKind::Board,
        Some(ResourceRef::Board(board_id)),
        move |_scope| async move { Ok::<_, ApiError>(Board::delete(db, board_id).await?) },
    )
    .await?;

    tracing::info!(user_id = %auth.user_id, board_id = %board_id, "Board deleted");

    Ok(StatusCode::NO_CONTENT)
}
