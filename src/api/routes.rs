/*
 * Responsibility
 * - URL structure of the API
 * - which routes are public vs gated is decided by the AccessPolicy, not here
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{
    auth::login,
    health::health,
    users::{create_user, get_user, list_users},
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth", post(login))
        .route("/user", get(list_users).post(create_user))
        .route("/user/{id}", get(get_user))
}
