/*
 * Responsibility
 * - /user handlers: create (public), single read (public), list (gated)
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::debug;

use crate::api::dto::users::{CreateUserRequest, UserResponse};
use crate::api::extractors::AuthCtxExtractor;
use crate::error::AppError;
use crate::repos::user_store::NewUser;
use crate::state::AppState;

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(user.into()))
}

pub async fn list_users(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    debug!(user_id = ctx.user_id, "listing users");

    let users = state.users.find_all().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::InvalidRequest(msg.to_string()))?;

    let password_hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST).map_err(|e| {
        tracing::error!(error = %e, "password hashing failed");
        AppError::Internal
    })?;

    let user = state
        .users
        .save(NewUser {
            name: req.name,
            username: req.username,
            password_hash,
            authorities: req.authorities,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}
