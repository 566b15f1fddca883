use std::sync::Arc;

use tracing::warn;

use crate::error::AppError;
use crate::repos::user_store::{UserRecord, UserStore};

/// Username/password verification for the login endpoint.
///
/// Callers get a single rejection value for every credential failure: an
/// unknown username and a wrong password are indistinguishable.
pub struct Authenticator {
    users: Arc<dyn UserStore>,
    // Verified against when the username does not exist, so both rejection
    // paths cost one bcrypt comparison.
    fallback_hash: String,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        let fallback_hash = bcrypt::hash("*", bcrypt::DEFAULT_COST).unwrap_or_default();
        Self {
            users,
            fallback_hash,
        }
    }

    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserRecord, AppError> {
        let user = match self.users.find_by_username(username).await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "user lookup failed during login");
                return Err(AppError::Internal);
            }
        };

        let Some(user) = user else {
            let _ = bcrypt::verify(password, &self.fallback_hash);
            return Err(AppError::LoginRejected);
        };

        match bcrypt::verify(password, &user.password_hash) {
            Ok(true) => Ok(user),
            Ok(false) => Err(AppError::LoginRejected),
            Err(e) => {
                warn!(user_id = user.id, error = %e, "stored password hash is unreadable");
                Err(AppError::LoginRejected)
            }
        }
    }
}
