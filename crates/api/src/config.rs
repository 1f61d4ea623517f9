use std::str::FromStr;
use std::time::Duration;

use crate::auth::jwt::JwtConfig;
use crate::middleware::rate_limit::RateLimitConfig;

/// Origins allowed by default: the local dev server and the deployed front ends.
const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost:5173,https://blog.connortran.io.vn,https://blog-api.connortran.io.vn";

/// A configuration value that is missing or does not parse.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// Everything except the database URL and the JWT secret has a default
/// suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Postgres connection string.
    pub database_url: String,
    /// Upper bound on pooled connections (default: `20`).
    pub db_max_connections: u32,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Per-IP request limiter settings.
    pub rate_limit: RateLimitConfig,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                          |
    /// |--------------------------|----------------------------------|
    /// | `DATABASE_URL`           | required (falls back to `DB_DSN`)|
    /// | `HOST`                   | `0.0.0.0`                        |
    /// | `PORT`                   | `8080`                           |
    /// | `DB_MAX_CONNECTIONS`     | `20`                             |
    /// | `CORS_ORIGINS`           | local dev + deployed front ends  |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                             |
    /// | `RATE_LIMIT_INTERVAL_MS` | `100`                            |
    /// | `RATE_LIMIT_BURST`       | `5`                              |
    ///
    /// JWT settings are documented on [`JwtConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("DB_DSN"))
            .map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.into()),
        );

        let rate_limit = RateLimitConfig {
            interval: Duration::from_millis(env_or("RATE_LIMIT_INTERVAL_MS", 100u64)?),
            burst: env_or("RATE_LIMIT_BURST", 5u32)?,
        };

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", 8080u16)?,
            database_url,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 20u32)?,
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30u64)?,
            rate_limit,
            jwt: JwtConfig::from_env()?,
        })
    }
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Read `name` from the environment, or `default` when unset.
pub(crate) fn env_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected: std::any::type_name::<T>(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_drops_blanks() {
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn test_default_origins_are_valid_header_values() {
        for origin in parse_origins(DEFAULT_CORS_ORIGINS) {
            assert!(
                origin.parse::<axum::http::HeaderValue>().is_ok(),
                "'{origin}' must parse as a header value"
            );
        }
    }
}
