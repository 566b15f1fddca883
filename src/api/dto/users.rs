/*
 * Responsibility
 * - user request/response DTOs
 * - UserResponse never carries the password hash
 */
use serde::{Deserialize, Serialize};

use crate::repos::user_store::UserRecord;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub authorities: Vec<String>,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if self.password.len() < 8 {
            return Err("password must be at least 8 characters");
        }
        if self.authorities.iter().any(|a| a.trim().is_empty()) {
            return Err("authorities cannot be blank");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub authorities: Vec<String>,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            authorities: user.authorities,
        }
    }
}
