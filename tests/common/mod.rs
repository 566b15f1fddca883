//! Shared harness for the integration tests: an in-memory user store and a
//! fully assembled router (auth filter, access gate, transport layers).

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use security_api::app;
use security_api::config::{AppEnv, Config};
use security_api::middleware::access_gate;
use security_api::repos::error::RepoError;
use security_api::repos::user_store::{NewUser, UserRecord, UserStore};
use security_api::services::auth::{Authenticator, TokenService};
use security_api::state::AppState;

pub const SECRET: &str = "integration-test-signing-secret-0123456789";

#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<Vec<UserRecord>>,
}

impl InMemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUsers {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepoError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn save(&self, user: NewUser) -> Result<UserRecord, RepoError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(RepoError::Conflict);
        }

        let record = UserRecord {
            id: users.len() as i64 + 1,
            name: user.name,
            username: user.username,
            password_hash: user.password_hash,
            authorities: user.authorities,
        };
        users.push(record.clone());
        Ok(record)
    }

    async fn find_all(&self) -> Result<Vec<UserRecord>, RepoError> {
        Ok(self.users.lock().unwrap().clone())
    }
}

pub struct TestApp {
    pub router: Router,
    pub tokens: Arc<TokenService>,
    pub users: Arc<InMemoryUsers>,
}

pub fn test_app(ttl_seconds: u64) -> TestApp {
    let users = Arc::new(InMemoryUsers::new());
    let tokens = Arc::new(TokenService::new(
        SECRET.as_bytes(),
        "security-api".to_string(),
        ttl_seconds,
        0,
    ));

    let store: Arc<dyn UserStore> = users.clone();
    let auth = Arc::new(Authenticator::new(store.clone()));
    let state = AppState::new(
        tokens.clone(),
        auth,
        store,
        Arc::new(access_gate::default_policy()),
    );

    let router = app::build_router(state, &test_config());

    TestApp {
        router,
        tokens,
        users,
    }
}

fn test_config() -> Config {
    Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        app_env: AppEnv::Development,
        database_url: String::new(),
        cors_allowed_origins: Vec::new(),
        jwt_secret: SECRET.to_string(),
        jwt_issuer: "security-api".to_string(),
        token_ttl_seconds: 3600,
        token_leeway_seconds: 0,
    }
}

pub async fn seed_user(
    users: &InMemoryUsers,
    name: &str,
    username: &str,
    password: &str,
    authorities: &[&str],
) -> UserRecord {
    users
        .save(NewUser {
            name: name.to_string(),
            username: username.to_string(),
            // low cost keeps the suite fast; verify() reads cost from the hash
            password_hash: bcrypt::hash(password, 4).unwrap(),
            authorities: authorities.iter().map(|s| s.to_string()).collect(),
        })
        .await
        .unwrap()
}
