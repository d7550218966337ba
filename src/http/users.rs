use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::middleware::AuthenticatedUser;
use super::response::ApiResponse;
use super::AppState;
use crate::error::AppError;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub api_key: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<ApiResponse, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::ValidationFailed("name must not be empty".into()));
    }
    if !req.email.contains('@') {
        return Err(AppError::ValidationFailed("email is not valid".into()));
    }

    let (user, api_key) = state.users.register(req.name, req.email).await?;

    Ok(ApiResponse::created(RegisterResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        api_key,
    }))
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse, AppError> {
    let user = state.users.get(id).await?;
    Ok(ApiResponse::ok(UserResponse {
        id: user.id,
        name: user.name,
        email: user.email,
    }))
}
