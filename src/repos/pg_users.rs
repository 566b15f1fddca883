/*
 * Responsibility
 * - SQLx operations for the users / authorities tables
 * - implements UserStore over a PgPool
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;
use crate::repos::user_store::{NewUser, UserRecord, UserStore};

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    username: String,
    password: String,
    authorities: Vec<String>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        UserRecord {
            id: row.id,
            name: row.name,
            username: row.username,
            password_hash: row.password,
            authorities: row.authorities,
        }
    }
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.name, u.username, u.password,
                   COALESCE(array_agg(a.name) FILTER (WHERE a.name IS NOT NULL), '{}') AS authorities
            FROM users u
            LEFT JOIN user_authorities ua ON ua.user_id = u.id
            LEFT JOIN authorities a ON a.id = ua.authority_id
            WHERE u.id = $1
            GROUP BY u.id
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRecord::from))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.name, u.username, u.password,
                   COALESCE(array_agg(a.name) FILTER (WHERE a.name IS NOT NULL), '{}') AS authorities
            FROM users u
            LEFT JOIN user_authorities ua ON ua.user_id = u.id
            LEFT JOIN authorities a ON a.id = ua.authority_id
            WHERE u.username = $1
            GROUP BY u.id
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRecord::from))
    }

    async fn save(&self, user: NewUser) -> Result<UserRecord, RepoError> {
        let mut tx = self.pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO users (name, username, password)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepoError::from_sqlx)?;

        for authority in &user.authorities {
            let (authority_id,): (i64,) = sqlx::query_as(
                r#"
                INSERT INTO authorities (name)
                VALUES ($1)
                ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                RETURNING id
                "#,
            )
            .bind(authority)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO user_authorities (user_id, authority_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(id)
            .bind(authority_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(UserRecord {
            id,
            name: user.name,
            username: user.username,
            password_hash: user.password_hash,
            authorities: user.authorities,
        })
    }

    async fn find_all(&self) -> Result<Vec<UserRecord>, RepoError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.name, u.username, u.password,
                   COALESCE(array_agg(a.name) FILTER (WHERE a.name IS NOT NULL), '{}') AS authorities
            FROM users u
            LEFT JOIN user_authorities ua ON ua.user_id = u.id
            LEFT JOIN authorities a ON a.id = ua.authority_id
            GROUP BY u.id
            ORDER BY u.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UserRecord::from).collect())
    }
}
