/*
 * Responsibility
 * - Load and validate process configuration from the environment
 * - Startup fails on anything missing or unusable (notably the signing secret)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub database_url: String,
    pub cors_allowed_origins: Vec<String>,

    /// HS256 signing secret for bearer tokens. Never logged, never serialized.
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub token_ttl_seconds: u64,
    pub token_leeway_seconds: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // jwt_secret and the DSN (which may carry credentials) are omitted.
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("token_leeway_seconds", &self.token_leeway_seconds)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        // HS256 with a short secret is not worth starting up with.
        if jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }

        let jwt_issuer =
            std::env::var("JWT_ISSUER").unwrap_or_else(|_| "security-api".to_string());

        let token_ttl_seconds = std::env::var("TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600); // 1 hour
        if token_ttl_seconds == 0 {
            return Err(ConfigError::Invalid("TOKEN_TTL_SECONDS"));
        }

        let token_leeway_seconds = std::env::var("TOKEN_LEEWAY_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);

        Ok(Config {
            addr,
            app_env,
            database_url,
            cors_allowed_origins,
            jwt_secret,
            jwt_issuer,
            token_ttl_seconds,
            token_leeway_seconds,
        })
    }
}
