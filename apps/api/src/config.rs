use anyhow::{Context, Result};

const DEFAULT_CALLBACK_URL: &str = "http://localhost:4598/auth/google/secrets";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_acquire_timeout_secs: u64,
    /// When unset, sessions live in process memory.
    pub redis_url: Option<String>,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_callback_url: String,
    pub frontend_url: String,
    pub session_ttl_secs: u64,
    pub secure_cookies: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: database_url_from_env()?,
            database_acquire_timeout_secs: parse_env("DATABASE_ACQUIRE_TIMEOUT_SECS", 5)?,
            redis_url: std::env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            google_client_id: require_env("GOOGLE_CLIENT_ID")?,
            google_client_secret: require_env("GOOGLE_CLIENT_SECRET")?,
            google_callback_url: std::env::var("GOOGLE_CALLBACK_URL")
                .unwrap_or_else(|_| DEFAULT_CALLBACK_URL.to_string()),
            frontend_url: require_env("FRONTEND_URL")?
                .trim_end_matches('/')
                .to_string(),
            session_ttl_secs: parse_env("SESSION_TTL_SECS", 86_400)?,
            secure_cookies: std::env::var("APP_ENV").is_ok_and(|env| env == "production"),
            port: parse_env("PORT", 4598)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Where the browser lands after a failed identity-provider handshake.
    pub fn login_url(&self) -> String {
        format!("{}/login", self.frontend_url)
    }
}

/// Prefers `DATABASE_URL`; falls back to the discrete `DATABASE_*` variables.
fn database_url_from_env() -> Result<String> {
    if let Ok(url) = std::env::var("DATABASE_URL") {
        return Ok(url);
    }
    let host = require_env("DATABASE_HOST")?;
    let port: u16 = parse_env("DATABASE_PORT", 5432)?;
    let user = require_env("DATABASE_USER")?;
    let password = std::env::var("DATABASE_PASSWORD").unwrap_or_default();
    let name = require_env("DATABASE_NAME")?;
    Ok(format!("postgres://{user}:{password}@{host}:{port}/{name}"))
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/candidates_test".to_string(),
            database_acquire_timeout_secs: 1,
            redis_url: None,
            google_client_id: "client-id".to_string(),
            google_client_secret: "client-secret".to_string(),
            google_callback_url: DEFAULT_CALLBACK_URL.to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            session_ttl_secs: 3600,
            secure_cookies: false,
            port: 4598,
            rust_log: "debug".to_string(),
        }
    }
}
