/*
 * Responsibility
 * - Run once per request, before the access gate
 * - Extract the bearer token, verify it, resolve the subject, and attach
 *   AuthCtx to request extensions
 * - Never reject: a request that fails any step stays anonymous and is
 *   judged by the gate instead
 */
use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};
use tracing::{debug, warn};

use crate::api::extractors::AuthCtx;
use crate::state::AppState;

pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, authenticate))
}

pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let verified = bearer_token(req.headers()).and_then(|token| state.tokens.verify(token).ok());

    if let Some(verified) = verified {
        match state.users.find_by_id(verified.user_id).await {
            Ok(Some(user)) => {
                req.extensions_mut().insert(AuthCtx::from(user));
            }
            Ok(None) => {
                // Valid token for a subject that no longer exists (deleted
                // account); the request continues anonymously.
                debug!(user_id = verified.user_id, "token subject not found");
            }
            Err(e) => {
                warn!(error = %e, "user lookup failed; request continues unauthenticated");
            }
        }
    }

    next.run(req).await
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// Anything else (missing header, another scheme, an empty remainder) is "no
/// credential" rather than an error: unauthenticated requests are a normal
/// state for public routes.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let token = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;

    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(v) = value {
            headers.insert(header::AUTHORIZATION, HeaderValue::from_str(v).unwrap());
        }
        headers
    }

    #[test]
    fn strips_the_bearer_prefix() {
        assert_eq!(
            bearer_token(&headers(Some("Bearer abc.def.ghi"))),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn anything_else_is_absent() {
        assert_eq!(bearer_token(&headers(None)), None);
        assert_eq!(bearer_token(&headers(Some(""))), None);
        assert_eq!(bearer_token(&headers(Some("abc.def.ghi"))), None);
        assert_eq!(bearer_token(&headers(Some("Basic xyz"))), None);
        assert_eq!(bearer_token(&headers(Some("Bearer "))), None);
        // the scheme is case-sensitive, like the original header contract
        assert_eq!(bearer_token(&headers(Some("bearer abc.def.ghi"))), None);
    }
}
