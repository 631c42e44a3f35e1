/// Account endpoints
///
/// - `POST /v1/auth/registration` creates an account and signs it in
/// - `POST /v1/auth/login` exchanges credentials for tokens
/// - `POST /v1/auth/refresh` exchanges a refresh token for an access token
///
/// Registration and login share one response shape:
///
/// ```json
/// {
///   "access_token": "eyJ...",
///   "refresh_token": "eyJ...",
///   "fullname": "Ada Lovelace",
///   "email": "ada@example.com",
///   "user_id": "uuid"
/// }
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use kanban_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RegistrationRequest {
    #[validate(length(min = 1, max = 100, message = "Full name must be 1 to 100 characters"))]
    pub fullname: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,

    pub repeated_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Tokens plus the signed-in user
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub fullname: String,
    pub email: String,
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

fn issue_tokens(user: &User, secret: &str) -> ApiResult<AuthResponse> {
    let access_token =
        jwt::create_token(&jwt::Claims::new(user.id, jwt::TokenType::Access), secret)?;
    let refresh_token =
        jwt::create_token(&jwt::Claims::new(user.id, jwt::TokenType::Refresh), secret)?;

    Ok(AuthResponse {
        access_token,
        refresh_token,
        fullname: user.fullname.clone(),
        email: user.email.clone(),
        user_id: user.id,
    })
}

/// Registers a new account
///
/// # Errors
///
/// - `400 Bad Request`: invalid fields, short password, or passwords that differ
/// - `409 Conflict`: the email is already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegistrationRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;
    password::check_new_password(&req.password, &req.repeated_password)?;

    let email = req.email.trim().to_string();
    if User::email_exists(&state.db, &email).await? {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    // A concurrent registration still loses on the unique email index
    let user = User::create(
        &state.db,
        CreateUser {
            email,
            fullname: req.fullname.trim().to_string(),
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(issue_tokens(&user, state.jwt_secret())?)))
}

/// Signs in with email and password
///
/// # Errors
///
/// - `400 Bad Request`: malformed email
/// - `401 Unauthorized`: unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let user = User::find_by_email(&state.db, req.email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "Login rejected");
        return Err(invalid());
    }

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(issue_tokens(&user, state.jwt_secret())?))
}

/// Exchanges a refresh token for a new access token
///
/// # Errors
///
/// - `401 Unauthorized`: invalid, expired, or access-typed token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_validation() {
        let req = RegistrationRequest {
            fullname: "Ada Lovelace".to_string(),
            email: "not-an-email".to_string(),
            password: "analytical".to_string(),
            repeated_password: "analytical".to_string(),
        };

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_registration_requires_fullname() {
        let req = RegistrationRequest {
            fullname: String::new(),
            email: "ada@example.com".to_string(),
            password: "analytical".to_string(),
            repeated_password: "analytical".to_string(),
        };

        assert!(req.validate().is_err());
    }

    #[test]
    fn test_login_request_valid() {
        let req = LoginRequest {
            email: "ada@example.com".to_string(),
            password: "whatever".to_string(),
        };

        assert!(req.validate().is_ok());
    }
}
