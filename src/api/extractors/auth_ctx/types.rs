/*
 * Responsibility
 * - the "authenticated context" type handlers see
 * - the bearer-auth middleware verifies and stores it in request extensions;
 *   handlers receive only this type
 */
use crate::repos::user_store::UserRecord;

/// Identity attached to an authenticated request, scoped to that request's
/// extensions and discarded with it.
///
/// `authorities` is empty for users with no grants, never missing.
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub user_id: i64,
    pub name: String,
    pub username: String,
    pub authorities: Vec<String>,
}

impl From<UserRecord> for AuthCtx {
    fn from(user: UserRecord) -> Self {
        Self {
            user_id: user.id,
            name: user.name,
            username: user.username,
            authorities: user.authorities,
        }
    }
}
