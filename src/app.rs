use std::{panic, process, sync::Arc};

use axum::Router;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::error::AppError;
use crate::middleware::{access_gate, bearer_auth, cors, http};
use crate::repos::pg_users::PgUserStore;
use crate::repos::user_store::UserStore;
use crate::services::auth::{Authenticator, TokenService};
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG wins; the default keeps request logs visible without debug
    // noise. Ex: RUST_LOG=info,security_api=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Surface panics through tracing; stderr can be invisible depending
        // on how the process is launched.
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }));
}

pub async fn run() -> Result<(), AppError> {
    init_tracing();
    let config = Config::from_env()?;

    // Fail fast on panics in development; keep serving in production.
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let pool = PgPool::connect(&config.database_url).await.map_err(|e| {
        tracing::error!(error = %e, "failed to connect to database");
        AppError::Internal
    })?;
    sqlx::migrate!().run(&pool).await.map_err(|e| {
        tracing::error!(error = %e, "migrations failed");
        AppError::Internal
    })?;

    let state = build_state(&config, pool);
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(|_| AppError::Internal)?;
    axum::serve(listener, app)
        .await
        .map_err(|_| AppError::Internal)?;

    Ok(())
}

pub fn build_state(config: &Config, pool: PgPool) -> AppState {
    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool));
    let tokens = Arc::new(TokenService::new(
        config.jwt_secret.as_bytes(),
        config.jwt_issuer.clone(),
        config.token_ttl_seconds,
        config.token_leeway_seconds,
    ));
    let auth = Arc::new(Authenticator::new(users.clone()));

    AppState::new(
        tokens,
        auth,
        users,
        Arc::new(access_gate::default_policy()),
    )
}

/// Assemble the full middleware stack.
///
/// Layer ordering is an invariant: the bearer-auth filter must run before
/// the access gate so the gate sees the security context the filter
/// attached. `Router::layer` wraps outward, so the gate is applied first.
pub fn build_router(state: AppState, config: &Config) -> Router {
    let api = api::routes();
    let api = access_gate::apply(api, state.clone());
    let api = bearer_auth::apply(api, state.clone());

    let app = api.with_state(state);
    let app = cors::apply(app, config);
    http::apply(app)
}
