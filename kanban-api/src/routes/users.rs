/// User lookup
///
/// `GET /v1/email-check?email=...` resolves an email to a user so the client
/// can add them to a board.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    Json,
};
use kanban_shared::models::user::{User, UserSummary};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct EmailCheckQuery {
    #[validate(
        required(message = "Email is required"),
        email(message = "Invalid email format")
    )]
    pub email: Option<String>,
}

/// Looks up a user by email
///
/// # Errors
///
/// - `400 Bad Request`: missing or malformed email
/// - `404 Not Found`: no user with that email
pub async fn email_check(
    State(state): State<AppState>,
    Query(query): Query<EmailCheckQuery>,
) -> ApiResult<Json<UserSummary>> {
    query.validate()?;

    let email = query
        .email
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| ApiError::field("email", "Email is required"))?;

    let user = User::find_by_email(&state.db, email)
        .await?
        .ok_or_else(|| ApiError::NotFound("Email not found".to_string()))?;

    Ok(Json(UserSummary::from(&user)))
}
