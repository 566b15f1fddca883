use async_trait::async_trait;

use crate::repos::error::RepoError;

/// A user as the auth subsystem sees it.
///
/// `authorities` is always materialized: a user with no grants carries an
/// empty set, never a missing one.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub password_hash: String,
    pub authorities: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub password_hash: String,
    pub authorities: Vec<String>,
}

/// The user store the auth subsystem depends on. Production uses Postgres
/// (`PgUserStore`); tests substitute an in-memory implementation.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError>;

    async fn save(&self, user: NewUser) -> Result<UserRecord, RepoError>;

    async fn find_all(&self) -> Result<Vec<UserRecord>, RepoError>;
}
