use axum::{Json, extract::State};

use crate::api::dto::auth::{LoginRequest, TokenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// POST /auth
///
/// Exchanges a username/password pair for a bearer token. Rejections are
/// uniform: the response does not say whether the username or the password
/// was wrong.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::InvalidRequest(msg.to_string()))?;

    let user = state.auth.authenticate(&req.username, &req.password).await?;
    let token = state.tokens.issue(user.id)?;

    Ok(Json(TokenResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.ttl_seconds(),
    }))
}
