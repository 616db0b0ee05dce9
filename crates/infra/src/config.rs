//! Process configuration loaded from the environment.
//!
//! A `.env` file in the working directory is honoured when present. Every
//! setting has a default except `DATABASE_URL`; without it the service runs
//! on the in-memory store.

use std::net::{IpAddr, SocketAddr};

use chrono::Duration;
use thiserror::Error;

use jobboard_auth::TokenConfig;
use jobboard_observability::LogFormat;

const DEV_JWT_SECRET: &str = "insecure-dev-secret-change-me";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("APP_HOST must parse to an IPv4 or IPv6 address, got {0:?}")]
    InvalidHost(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: Option<DatabaseConfig>,
    pub auth: AuthConfig,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.host.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl core::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_hours: i64,
    pub bcrypt_cost: u32,
}

impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .field("refresh_ttl_hours", &self.refresh_ttl_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish_non_exhaustive()
    }
}

impl AuthConfig {
    /// True when `JWT_SECRET` was not set and the built-in secret is in use.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            secret: self.jwt_secret.clone(),
            issuer: self.jwt_issuer.clone(),
            access_ttl: Duration::minutes(self.access_ttl_minutes),
            refresh_ttl: Duration::hours(self.refresh_ttl_hours),
        }
    }
}

impl AppConfig {
    /// Load from the process environment (and `.env`, if any).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup; used by tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let server = ServerConfig {
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse(&var, "APP_PORT", "a port number", 8080)?,
        };

        let database = match var("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse(&var, "DATABASE_MAX_CONNECTIONS", "a positive integer", 5)?,
            }),
            None => None,
        };

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string());

        let auth = AuthConfig {
            jwt_secret,
            jwt_issuer: var("JWT_ISSUER").unwrap_or_else(|| "jobboard".to_string()),
            access_ttl_minutes: positive(&var, "ACCESS_TOKEN_TTL_MINUTES", 5)?,
            refresh_ttl_hours: positive(&var, "REFRESH_TOKEN_TTL_HOURS", 24)?,
            bcrypt_cost: bcrypt_cost(parse(&var, "BCRYPT_COST", "an integer between 4 and 31", 12)?)?,
        };

        let log_format = match var("LOG_FORMAT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "LOG_FORMAT",
                expected: "\"json\" or \"pretty\"",
                value: raw,
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            server,
            database,
            auth,
            log_format,
        })
    }
}

fn parse<T, F>(var: &F, key: &'static str, expected: &'static str, default: T) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            expected,
            value: raw,
        }),
        None => Ok(default),
    }
}

fn positive<F>(var: &F, key: &'static str, default: i64) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value: i64 = parse(var, key, "a positive integer", default)?;
    if value > 0 {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            key,
            expected: "a positive integer",
            value: value.to_string(),
        })
    }
}

fn bcrypt_cost(cost: u32) -> Result<u32, ConfigError> {
    if (4..=31).contains(&cost) {
        Ok(cost)
    } else {
        Err(ConfigError::Invalid {
            key: "BCRYPT_COST",
            expected: "an integer between 4 and 31",
            value: cost.to_string(),
        })
    }
}
