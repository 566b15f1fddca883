/*
 * Responsibility
 * - the meanings a repo reports upward
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("unique constraint violated")]
    Conflict,
}

impl RepoError {
    /// Postgres 23505 (unique_violation) becomes `Conflict`; everything else
    /// stays an opaque db error.
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e
            && dbe.code().as_deref() == Some("23505")
        {
            return RepoError::Conflict;
        }
        RepoError::Db(e)
    }
}
