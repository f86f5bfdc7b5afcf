//! Process configuration read from the environment.

use std::path::Path;

use secrecy::SecretString;
use thiserror::Error;
use tracing::{debug, warn};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug)]
pub struct AuthConfig {
    /// HS256 secret shared with the hosted auth provider.
    pub jwt_secret: SecretString,
    pub audience: Option<String>,
}

#[derive(Debug)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub auth: AuthConfig,
    pub sentry_dsn: Option<String>,
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    /// Load a `.env` file if there is one, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => warn!(error = %e, "Failed to load .env file"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL")
            .unwrap_or_else(|| sqlite_url(&utils::assets::default_database_path()));

        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let jwt_secret = get("AUTH_JWT_SECRET").ok_or(ConfigError::Missing("AUTH_JWT_SECRET"))?;

        Ok(Config {
            database_url,
            host,
            port,
            auth: AuthConfig {
                jwt_secret: SecretString::from(jwt_secret),
                audience: get("AUTH_JWT_AUDIENCE"),
            },
            sentry_dsn: get("SENTRY_DSN"),
            cors_allowed_origin: get("CORS_ALLOWED_ORIGIN"),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}", path.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = Config::from_lookup(lookup(&[("AUTH_JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3001);
        assert!(config.database_url.starts_with("sqlite://"));
        assert_eq!(config.auth.jwt_secret.expose_secret(), "s3cret");
        assert!(config.auth.audience.is_none());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = Config::from_lookup(lookup(&[("PORT", "8080")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("AUTH_JWT_SECRET")));
    }

    #[test]
    fn invalid_port_is_reported() {
        let err = Config::from_lookup(lookup(&[
            ("AUTH_JWT_SECRET", "s3cret"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("AUTH_JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("AUTH_JWT_AUDIENCE", "authenticated"),
            ("SENTRY_DSN", ""),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.auth.audience.as_deref(), Some("authenticated"));
        assert!(config.sentry_dsn.is_none());
    }
}
