use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    sub: String,
    iat: i64,
    exp: i64,
}

/// Uniform rejection for any unverifiable token. The concrete cause (bad
/// signature, expiry, wrong algorithm, corrupt structure) is logged and
/// deliberately not exposed to the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub user_id: i64,
}

// Internal detail for operator logs only; collapsed before it reaches callers.
#[derive(Debug, Error)]
enum Rejection {
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("invalid 'sub' claim (expected numeric user id)")]
    InvalidSubject,
}

/// Mints and verifies the HS256 bearer tokens this API runs on.
///
/// The verifier pins the algorithm: a token whose header announces anything
/// other than HS256 fails outright, regardless of its signature.
#[derive(Clone)]
pub struct TokenService {
    issuer: String,
    ttl_seconds: u64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &[u8], issuer: String, ttl_seconds: u64, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&issuer]);
        validation.leeway = leeway_seconds;
        validation.validate_aud = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer,
            ttl_seconds,
            validation,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Sign a token for `user_id`, valid from now for the configured TTL.
    pub fn issue(&self, user_id: i64) -> Result<String, AppError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Sign a token whose validity window starts at `issued_at`.
    pub fn issue_at(&self, user_id: i64, issued_at: DateTime<Utc>) -> Result<String, AppError> {
        let iat = issued_at.timestamp();
        let claims = Claims {
            iss: self.issuer.clone(),
            sub: user_id.to_string(),
            iat,
            exp: iat + self.ttl_seconds as i64,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                error!(error = %e, "failed to sign token");
                AppError::Internal
            })
    }

    /// Verify signature, issuer, and expiry, then extract the subject id.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, InvalidToken> {
        match self.decode(token) {
            Ok(verified) => Ok(verified),
            Err(e) => {
                debug!(error = %e, "rejected bearer token");
                Err(InvalidToken)
            }
        }
    }

    fn decode(&self, token: &str) -> Result<VerifiedToken, Rejection> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        let user_id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| Rejection::InvalidSubject)?;

        Ok(VerifiedToken { user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn service(ttl_seconds: u64) -> TokenService {
        TokenService::new(SECRET, "security-api".to_string(), ttl_seconds, 0)
    }

    #[test]
    fn round_trips_the_subject() {
        let svc = service(3600);
        let token = svc.issue(42).unwrap();
        assert_eq!(svc.verify(&token), Ok(VerifiedToken { user_id: 42 }));
    }

    #[test]
    fn accepts_a_token_inside_its_window() {
        let svc = service(3600);
        let token = svc
            .issue_at(7, Utc::now() - Duration::minutes(30))
            .unwrap();
        assert!(svc.verify(&token).is_ok());
    }

    #[test]
    fn rejects_a_token_past_its_window() {
        let svc = service(3600);
        let token = svc
            .issue_at(7, Utc::now() - Duration::minutes(61))
            .unwrap();
        assert_eq!(svc.verify(&token), Err(InvalidToken));
    }

    #[test]
    fn expiry_boundary_is_consistent() {
        let svc = service(3600);
        // A few seconds to either side of the boundary; leeway is zero, so
        // only the not-yet-expired one may pass.
        let inside = svc
            .issue_at(7, Utc::now() - Duration::seconds(3600 - 5))
            .unwrap();
        let outside = svc
            .issue_at(7, Utc::now() - Duration::seconds(3600 + 5))
            .unwrap();
        assert!(svc.verify(&inside).is_ok());
        assert!(svc.verify(&outside).is_err());
    }

    #[test]
    fn rejects_a_token_signed_with_another_secret() {
        let ours = service(3600);
        let theirs = TokenService::new(
            b"ffffffffffffffffffffffffffffffff",
            "security-api".to_string(),
            3600,
            0,
        );
        let token = theirs.issue(42).unwrap();
        assert_eq!(ours.verify(&token), Err(InvalidToken));
    }

    #[test]
    fn rejects_a_token_announcing_another_algorithm() {
        let svc = service(3600);
        let iat = Utc::now().timestamp();
        let claims = Claims {
            iss: "security-api".to_string(),
            sub: "42".to_string(),
            iat,
            exp: iat + 600,
        };
        // Structurally fine and signed with the right secret, but HS384.
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert_eq!(svc.verify(&token), Err(InvalidToken));
    }

    #[test]
    fn rejects_a_token_from_another_issuer() {
        let svc = service(3600);
        let other = TokenService::new(SECRET, "someone-else".to_string(), 3600, 0);
        let token = other.issue(42).unwrap();
        assert_eq!(svc.verify(&token), Err(InvalidToken));
    }

    #[test]
    fn rejects_garbage_input() {
        let svc = service(3600);
        for input in ["", "not-a-token", "a.b.c", "Bearer abc"] {
            assert_eq!(svc.verify(input), Err(InvalidToken), "input: {input:?}");
        }
    }

    #[test]
    fn rejects_a_non_numeric_subject() {
        let svc = service(3600);
        let iat = Utc::now().timestamp();
        let claims = Claims {
            iss: "security-api".to_string(),
            sub: "alice".to_string(),
            iat,
            exp: iat + 600,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert_eq!(svc.verify(&token), Err(InvalidToken));
    }
}
