use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_OPDB_BASE_URL: &str = "https://opdb.org";
const DEFAULT_IFPA_BASE_URL: &str = "https://api.ifpapinball.com/v1";
const DEFAULT_MACHINE_CACHE_HOURS: i64 = 24;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Startup configuration errors. Both variants are fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("{var} has invalid value {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub server_host: String,
    pub server_port: u16,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub opdb_base_url: String,
    pub opdb_api_token: Option<String>,
    pub ifpa_base_url: String,
    pub ifpa_api_key: Option<String>,
    pub machine_cache_hours: i64,
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let jwt_secret = var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let jwt_expiration_hours = var("JWT_EXPIRATION_HOURS")
            .ok_or(ConfigError::Missing("JWT_EXPIRATION_HOURS"))
            .and_then(|value| parse_hours("JWT_EXPIRATION_HOURS", &value))?;

        let server_port = match (var("SERVER_PORT"), var("PORT")) {
            (Some(value), _) => parse_number("SERVER_PORT", &value)?,
            (None, Some(value)) => parse_number("PORT", &value)?,
            (None, None) => DEFAULT_SERVER_PORT,
        };

        let machine_cache_hours = match var("MACHINE_CACHE_HOURS") {
            Some(value) => parse_hours("MACHINE_CACHE_HOURS", &value)?,
            None => DEFAULT_MACHINE_CACHE_HOURS,
        };
        let http_timeout_secs = match var("HTTP_TIMEOUT_SECS") {
            Some(value) => parse_positive("HTTP_TIMEOUT_SECS", &value)?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };
        let db_max_connections = match var("DB_MAX_CONNECTIONS") {
            Some(value) => parse_positive("DB_MAX_CONNECTIONS", &value)?,
            None => DEFAULT_DB_MAX_CONNECTIONS,
        };

        Ok(Config {
            database_url: var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            db_max_connections,
            server_host: var("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.into()),
            server_port,
            jwt_secret,
            jwt_expiration_hours,
            opdb_base_url: var("OPDB_BASE_URL").unwrap_or_else(|| DEFAULT_OPDB_BASE_URL.into()),
            opdb_api_token: var("OPDB_API_TOKEN"),
            ifpa_base_url: var("IFPA_BASE_URL").unwrap_or_else(|| DEFAULT_IFPA_BASE_URL.into()),
            ifpa_api_key: var("IFPA_API_KEY"),
            machine_cache_hours,
            http_timeout_secs,
        })
    }

    pub fn jwt_expiration(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.jwt_expiration_hours).unwrap_or(chrono::Duration::MAX)
    }

    pub fn machine_freshness(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.machine_cache_hours).unwrap_or(chrono::Duration::MAX)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn invalid(var: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
    }
}

fn parse_number<T: FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(var, value))
}

fn parse_positive<T: FromStr + PartialOrd + Default>(
    var: &'static str,
    value: &str,
) -> Result<T, ConfigError> {
    let parsed: T = parse_number(var, value)?;
    if parsed > T::default() {
        Ok(parsed)
    } else {
        Err(invalid(var, value))
    }
}

/// Positive hour count that fits a `chrono::Duration`.
fn parse_hours(var: &'static str, value: &str) -> Result<i64, ConfigError> {
    let hours: i64 = parse_positive(var, value)?;
    match chrono::Duration::try_hours(hours) {
        Some(_) => Ok(hours),
        None => Err(invalid(var, value)),
    }
}
