//! Process configuration.
//!
//! Everything is read from environment-style variables exactly once at startup and
//! handed to constructors as an explicit [`Config`]. Nothing in the crate reads the
//! environment after that.

use std::env;
use std::str::FromStr;

use jsonwebtoken::Algorithm;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// One year.
pub const MAX_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 525_600;
/// Ten years.
pub const MAX_REFRESH_TOKEN_EXPIRE_DAYS: i64 = 3_650;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Signing and hashing parameters shared by the token and credential services.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret_key: String,
    pub algorithm: Algorithm,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
    pub expose_headers: Vec<String>,
    /// Extra origins accepted when the whole `Origin` value matches.
    pub allow_origin_regex: Option<Regex>,
    pub allow_credentials: bool,
    pub max_age: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            server_port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            database: DatabaseConfig::from_lookup(&lookup)?,
            auth: AuthConfig::from_lookup(&lookup)?,
            cors: CorsConfig::from_lookup(&lookup)?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

impl DatabaseConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => {
                let host = required(lookup, "DB_HOST")?;
                let port: u16 = parse_or(lookup, "DB_PORT", 5432)?;
                let name = required(lookup, "DB_NAME")?;
                let user = required(lookup, "DB_USER")?;
                let password = required(lookup, "DB_PASSWORD")?;
                format!("postgres://{}:{}@{}:{}/{}", user, password, host, port, name)
            }
        };

        Ok(Self {
            url,
            max_connections: parse_or(lookup, "DB_MAX_CONNECTIONS", 5)?,
        })
    }
}

impl AuthConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key = required(lookup, "SECRET_KEY")?;
        if secret_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "SECRET_KEY",
                reason: "must not be empty".into(),
            });
        }

        let algorithm = match lookup("HASH_ALGORITHM") {
            Some(value) => parse_algorithm(&value)?,
            None => Algorithm::HS256,
        };

        let access_token_expire_minutes = bounded(
            lookup,
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            30,
            MAX_ACCESS_TOKEN_EXPIRE_MINUTES,
        )?;
        let refresh_token_expire_days = bounded(
            lookup,
            "REFRESH_TOKEN_EXPIRE_DAYS",
            7,
            MAX_REFRESH_TOKEN_EXPIRE_DAYS,
        )?;

        let bcrypt_cost = parse_or(lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                reason: "must be between 4 and 31".into(),
            });
        }

        Ok(Self {
            secret_key,
            algorithm,
            access_token_expire_minutes,
            refresh_token_expire_days,
            bcrypt_cost,
        })
    }
}

impl CorsConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            allow_origins: list_or(lookup, "CORS_ALLOW_ORIGINS", "*"),
            allow_methods: list_or(lookup, "CORS_ALLOW_METHODS", "GET"),
            allow_headers: list_or(lookup, "CORS_ALLOW_HEADERS", "*"),
            expose_headers: list_or(lookup, "CORS_EXPOSE_HEADERS", "*"),
            allow_origin_regex: origin_regex(lookup)?,
            allow_credentials: parse_or(lookup, "CORS_ALLOW_CREDENTIALS", true)?,
            max_age: parse_or(lookup, "CORS_MAX_AGE", 600)?,
        })
    }
}

fn origin_regex<F>(lookup: &F) -> Result<Option<Regex>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let pattern = match lookup("CORS_ALLOW_ORIGIN_REGEX") {
        Some(pattern) if !pattern.trim().is_empty() => pattern,
        _ => return Ok(None),
    };

    Regex::new(&format!("^(?:{})$", pattern.trim()))
        .map(Some)
        .map_err(|e| ConfigError::Invalid {
            key: "CORS_ALLOW_ORIGIN_REGEX",
            reason: e.to_string(),
        })
}

/// Only the symmetric HMAC family is accepted, since a single shared secret signs
/// and verifies.
fn parse_algorithm(value: &str) -> Result<Algorithm, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: "HASH_ALGORITHM",
        reason,
    };

    match Algorithm::from_str(value.trim()) {
        Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Ok(alg),
        Ok(other) => Err(invalid(format!("{:?} is not a symmetric algorithm", other))),
        Err(_) => Err(invalid(format!("unknown algorithm {:?}", value))),
    }
}

/// Parses a TTL that must lie in `1..=max`.
fn bounded<F>(lookup: &F, key: &'static str, default: i64, max: i64) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(lookup, key, default)?;
    if (1..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            key,
            reason: format!("must be between 1 and {}", max),
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).ok_or(ConfigError::Missing(key))
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn list_or<F>(lookup: &F, key: &'static str, default: &str) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
