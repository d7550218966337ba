use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is required but not set")]
    Missing(&'static str),
    #[error("environment variable {0} has invalid value: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub db_name: String,
    pub ssl_mode: String,
}

impl DatabaseConfig {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.user, self.password, self.host, self.port, self.db_name, self.ssl_mode
        )
    }
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
}

impl RedisConfig {
    /// `db` selects the logical namespace: 0 for the balance cache, 1 for locks.
    pub fn connection_string(&self, db: u8) -> String {
        match &self.password {
            Some(pw) => format!("redis://:{}@{}:{}/{}", pw, self.host, self.port, db),
            None => format!("redis://{}:{}/{}", self.host, self.port, db),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub level: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub logger: LoggerConfig,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig {
                port: parse_env("SERVER_PORT")?,
            },
            database: DatabaseConfig {
                host: require_env("DB_HOST")?,
                port: parse_env("DB_PORT")?,
                user: require_env("DB_USER")?,
                password: require_env("DB_PASSWORD")?,
                db_name: require_env("DB_NAME")?,
                ssl_mode: env_with_default("DB_SSLMODE", "disable"),
            },
            redis: RedisConfig {
                host: require_env("REDIS_HOST")?,
                port: parse_env("REDIS_PORT")?,
                password: env::var("REDIS_PASSWORD").ok().filter(|s| !s.is_empty()),
            },
            logger: LoggerConfig {
                level: env_with_default("LOG_LEVEL", "info"),
            },
        })
    }
}

fn require_env(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn env_with_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &'static str) -> Result<T, ConfigError> {
    let raw = require_env(key)?;
    raw.parse()
        .map_err(|_| ConfigError::Invalid(key, raw.clone()))
}
