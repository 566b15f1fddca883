/*
 * Responsibility
 * - Route-level authorization: an ordered (method, pattern) -> requirement
 *   table, first match wins, unmatched routes require authentication
 * - Applied after the bearer-auth filter; decides from the presence of
 *   AuthCtx whether the request may proceed
 */
use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware::{self, Next},
    response::Response,
};
use tracing::debug;

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    Authenticated,
}

#[derive(Debug, Clone)]
struct AccessRule {
    /// None matches every method.
    method: Option<Method>,
    pattern: String,
    requirement: Requirement,
}

/// Ordered route-access table. Evaluated in declaration order; the first
/// matching rule wins, and anything unmatched requires authentication.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
}

impl AccessPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn permit(mut self, method: Method, pattern: &str) -> Self {
        self.rules.push(AccessRule {
            method: Some(method),
            pattern: pattern.to_string(),
            requirement: Requirement::Public,
        });
        self
    }

    pub fn permit_any(mut self, pattern: &str) -> Self {
        self.rules.push(AccessRule {
            method: None,
            pattern: pattern.to_string(),
            requirement: Requirement::Public,
        });
        self
    }

    pub fn require(mut self, method: Method, pattern: &str) -> Self {
        self.rules.push(AccessRule {
            method: Some(method),
            pattern: pattern.to_string(),
            requirement: Requirement::Authenticated,
        });
        self
    }

    pub fn requirement(&self, method: &Method, path: &str) -> Requirement {
        for rule in &self.rules {
            let method_matches = rule.method.as_ref().is_none_or(|m| m == method);
            if method_matches && pattern_matches(&rule.pattern, path) {
                return rule.requirement;
            }
        }
        Requirement::Authenticated
    }
}

/// The table this API runs with: login, account creation, and single-user
/// reads are public; everything else needs a verified principal.
pub fn default_policy() -> AccessPolicy {
    AccessPolicy::new()
        .permit(Method::GET, "/health")
        .permit(Method::POST, "/auth")
        .permit(Method::POST, "/user")
        .permit(Method::GET, "/user/*")
}

/// Segment-wise match; `*` matches exactly one segment.
fn pattern_matches(pattern: &str, path: &str) -> bool {
    let mut pattern_segments = pattern.trim_matches('/').split('/');
    let mut path_segments = path.trim_matches('/').split('/');

    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return true,
            (Some(p), Some(s)) if p == "*" || p == s => continue,
            _ => return false,
        }
    }
}

pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, authorize))
}

pub async fn authorize(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    match state.policy.requirement(req.method(), req.uri().path()) {
        Requirement::Public => Ok(next.run(req).await),
        Requirement::Authenticated => {
            if req.extensions().get::<AuthCtx>().is_some() {
                Ok(next.run(req).await)
            } else {
                debug!(
                    method = %req.method(),
                    path = %req.uri().path(),
                    "denied unauthenticated request"
                );
                Err(AppError::Unauthorized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_match_wins() {
        let policy = AccessPolicy::new()
            .require(Method::GET, "/user/admin")
            .permit(Method::GET, "/user/*");
        assert_eq!(
            policy.requirement(&Method::GET, "/user/admin"),
            Requirement::Authenticated
        );
        assert_eq!(
            policy.requirement(&Method::GET, "/user/42"),
            Requirement::Public
        );
    }

    #[test]
    fn unmatched_requests_require_authentication() {
        let policy = default_policy();
        assert_eq!(
            policy.requirement(&Method::GET, "/user"),
            Requirement::Authenticated
        );
        assert_eq!(
            policy.requirement(&Method::DELETE, "/user/42"),
            Requirement::Authenticated
        );
        assert_eq!(
            policy.requirement(&Method::GET, "/nope"),
            Requirement::Authenticated
        );
    }

    #[test]
    fn method_is_part_of_the_rule() {
        let policy = default_policy();
        assert_eq!(
            policy.requirement(&Method::POST, "/auth"),
            Requirement::Public
        );
        assert_eq!(
            policy.requirement(&Method::GET, "/auth"),
            Requirement::Authenticated
        );
    }

    #[test]
    fn any_method_rules_match_every_method() {
        let policy = AccessPolicy::new().permit_any("/health");
        assert_eq!(
            policy.requirement(&Method::GET, "/health"),
            Requirement::Public
        );
        assert_eq!(
            policy.requirement(&Method::POST, "/health"),
            Requirement::Public
        );
    }

    #[test]
    fn wildcard_spans_exactly_one_segment() {
        assert!(pattern_matches("/user/*", "/user/42"));
        assert!(!pattern_matches("/user/*", "/user"));
        assert!(!pattern_matches("/user/*", "/user/42/avatar"));
        assert!(pattern_matches("/user/*/avatar", "/user/42/avatar"));
    }
}
