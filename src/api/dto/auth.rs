/*
 * Responsibility
 * - login request/response DTOs
 */
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if self.password.is_empty() {
            return Err("password is required");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    /// Scheme clients must present the token under. Always "Bearer".
    pub token_type: String,
    /// Seconds until expiry.
    pub expires_in: u64,
}
