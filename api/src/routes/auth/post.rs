use axum::{Json, extract::State, http::StatusCode};
use sea_orm::SqlErr;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::generate_jwt;
use crate::response::ApiResponse;
use db::models::user::{Model as UserModel, Role};
use util::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterReq {
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct LoginReq {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Default)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl From<UserModel> for UserResponse {
    fn from(u: UserModel) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            role: match u.role {
                Role::Teacher => "teacher".into(),
                Role::Student => "student".into(),
            },
        }
    }
}

#[derive(Debug, Serialize, Default)]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: String,
    pub user: UserResponse,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterReq>,
) -> (StatusCode, Json<ApiResponse<AuthResponse>>) {
    if let Err(e) = body.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::error(e.to_string())),
        );
    }

    match UserModel::create(
        state.db(),
        &body.username,
        &body.email,
        &body.password,
        body.role,
    )
    .await
    {
        Ok(user) => {
            let (token, expires_at) = generate_jwt(user.id, user.role);
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(
                    AuthResponse {
                        token,
                        expires_at,
                        user: user.into(),
                    },
                    "User registered successfully",
                )),
            )
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::error("Username or email already in use")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to register user");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to register user")),
            )
        }
    }
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginReq>,
) -> (StatusCode, Json<ApiResponse<AuthResponse>>) {
    match UserModel::verify_credentials(state.db(), &body.username, &body.password).await {
        Ok(Some(user)) => {
            let (token, expires_at) = generate_jwt(user.id, user.role);
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    AuthResponse {
                        token,
                        expires_at,
                        user: user.into(),
                    },
                    "Login successful",
                )),
            )
        }
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Invalid username or password")),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to verify credentials");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to log in")),
            )
        }
    }
}
