use std::fmt::Display;
use std::str::FromStr;

use anyhow::{anyhow, Context};
use axum::http::HeaderValue;
use huduma_core::validation::validate_urgent_window;
use huduma_lifecycle::LifecycleConfig;

use crate::auth::jwt::JwtConfig;

/// Log output format, selected with `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines (default).
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}', expected 'pretty' or 'json'")),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// Defaults suit local development; override via the environment in production.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Postgres connection string.
    pub database_url: String,
    /// Pool size (default: [`huduma_db::DEFAULT_MAX_CONNECTIONS`]).
    pub database_max_connections: u32,
    pub log_format: LogFormat,
    /// JWT validation settings.
    pub jwt: JwtConfig,
    /// Lifecycle tunables.
    pub lifecycle: LifecycleConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `DATABASE_URL`              | required                |
    /// | `DATABASE_MAX_CONNECTIONS`  | `20`                    |
    /// | `HOST`                      | `0.0.0.0`               |
    /// | `PORT`                      | `3000`                  |
    /// | `CORS_ORIGINS`              | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                    |
    /// | `JWT_SECRET`                | required                |
    /// | `URGENT_START_WINDOW_HOURS` | `24`                    |
    /// | `LOG_FORMAT`                | `pretty`                |
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|o| {
                o.parse::<HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin '{o}'"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let urgent_start_window_hours = urgent_window(env_or(
            "URGENT_START_WINDOW_HOURS",
            LifecycleConfig::default().urgent_start_window_hours,
        )?)?;

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", 3000)?,
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30)?,
            database_url,
            database_max_connections: env_or(
                "DATABASE_MAX_CONNECTIONS",
                huduma_db::DEFAULT_MAX_CONNECTIONS,
            )?,
            log_format: env_or("LOG_FORMAT", LogFormat::Pretty)?,
            jwt: JwtConfig::from_env()?,
            lifecycle: LifecycleConfig {
                urgent_start_window_hours,
            },
        })
    }
}

fn urgent_window(hours: i64) -> anyhow::Result<i64> {
    validate_urgent_window(hours).map_err(|e| anyhow!("URGENT_START_WINDOW_HOURS: {e}"))
}

/// Parse `key` from the environment, falling back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => Ok(default),
    }
}
