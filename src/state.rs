/*
 * Responsibility
 * - Shared application context handed to the Router
 * - Everything here is built once at startup and read-only afterwards, so
 *   concurrent access needs no synchronization beyond the Arcs
 */
use std::sync::Arc;

use crate::middleware::access_gate::AccessPolicy;
use crate::repos::user_store::UserStore;
use crate::services::auth::{Authenticator, TokenService};

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub auth: Arc<Authenticator>,
    pub users: Arc<dyn UserStore>,
    pub policy: Arc<AccessPolicy>,
}

impl AppState {
    pub fn new(
        tokens: Arc<TokenService>,
        auth: Arc<Authenticator>,
        users: Arc<dyn UserStore>,
        policy: Arc<AccessPolicy>,
    ) -> Self {
        Self {
            tokens,
            auth,
            users,
            policy,
        }
    }
}
